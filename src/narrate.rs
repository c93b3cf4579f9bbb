//! Prompts for the language model: the landmark list and the tour write-up.

use crate::Result;
use crate::model::Candidate;
use crate::services::TextGenerator;

/// Stops covered by the first part of a tour description.
pub const FIRST_PART_STOPS: usize = 5;

const LIST_FORMAT_INSTRUCTIONS: &str = "Your response should be a list of comma separated values, \
     eg: `foo, bar, baz` or `foo,bar,baz`";

pub fn landmark_prompt(city: &str, count: usize) -> String {
    format!(
        "Return a comma-separated list of the {count} best landmarks in {city}. \
         Only return the list. {LIST_FORMAT_INSTRUCTIONS}"
    )
}

fn first_part_prompt(city: &str, activity: &str, landmarks: &str, end: &str) -> String {
    format!(
        "You are an experienced tour guide in {city}. You love telling more about landmarks \
         in a short way. Create a {activity} route for {city} in markdown, using headings \
         with ##, passing by the following landmarks: {landmarks}. End with the introduction \
         of the next landmark {end}, as if it was the next destination, but don't discuss it."
    )
}

fn second_part_prompt(city: &str, activity: &str, landmarks: &str, previous: &str) -> String {
    format!(
        "You are an experienced tour guide in {city}. You love telling more about landmarks \
         in a short way. Create a {activity} route for {city} in markdown, using headings \
         with ##, passing by the following landmarks: {landmarks}. Start your explanation \
         with 'Continuing from {previous}'."
    )
}

fn names(stops: &[Candidate]) -> String {
    stops
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The prompts needed to describe `stops`: one for short tours, two otherwise.
pub fn description_prompts(city: &str, activity: &str, stops: &[Candidate]) -> Vec<String> {
    let head = &stops[..stops.len().min(FIRST_PART_STOPS)];

    // six or more stops: part one hands over to stop six, part two continues
    match stops.get(FIRST_PART_STOPS) {
        None => vec![first_part_prompt(city, activity, &names(head), "")],
        Some(next) => vec![
            first_part_prompt(city, activity, &names(head), &next.name),
            second_part_prompt(
                city,
                activity,
                &names(&stops[FIRST_PART_STOPS..]),
                &head[FIRST_PART_STOPS - 1].name,
            ),
        ],
    }
}

/// Generate the markdown tour description for stops in visiting order.
pub fn describe_route(
    generator: &dyn TextGenerator,
    city: &str,
    activity: &str,
    stops: &[Candidate],
) -> Result<String> {
    let parts = description_prompts(city, activity, stops)
        .iter()
        .map(|prompt| generator.generate(prompt))
        .collect::<Result<Vec<_>>>()?;
    log::info!("generated a {} part tour description", parts.len());
    Ok(parts.join(" "))
}
