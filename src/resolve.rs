//! Looks up every landmark name and keeps the ones close to the city.

use std::fmt;

use crate::Error;
use crate::model::{Candidate, CityAnchor};
use crate::services::PlaceLookup;
use crate::utils::geodesic_distance_km;

/// Where accepted landmarks must lie. Each constraint applies only when set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub radius_km: Option<f64>,
    /// Require the point to fall inside the anchor's bounding box, if it has one.
    pub within_bounding_box: bool,
}

impl SearchArea {
    pub fn radius(radius_km: f64) -> Self {
        Self {
            radius_km: Some(radius_km),
            within_bounding_box: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotFound,
    LookupFailed(String),
    OutsideRadius { distance_km: f64 },
    OutsideBoundingBox,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::LookupFailed(message) => write!(f, "lookup failed: {message}"),
            SkipReason::OutsideRadius { distance_km } => {
                write!(f, "{distance_km:.1} km from the city center")
            }
            SkipReason::OutsideBoundingBox => write!(f, "outside the city limits"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub candidates: Vec<Candidate>,
    pub skipped: Vec<Skipped>,
}

/// Resolve `names` into candidate rows, in input order.
pub fn resolve(
    names: &[String],
    anchor: &CityAnchor,
    area: &SearchArea,
    lookup: &dyn PlaceLookup,
) -> Vec<Candidate> {
    resolve_with_report(names, anchor, area, lookup).candidates
}

/// Same as [`resolve`], also reporting why each dropped name was dropped.
pub fn resolve_with_report(
    names: &[String],
    anchor: &CityAnchor,
    area: &SearchArea,
    lookup: &dyn PlaceLookup,
) -> Resolution {
    let mut resolution = Resolution::default();

    for name in names {
        match check(name, anchor, area, lookup) {
            Ok(candidate) => resolution.candidates.push(candidate),
            Err(reason) => {
                log::warn!("skipping landmark '{name}': {reason}");
                resolution.skipped.push(Skipped {
                    name: name.clone(),
                    reason,
                });
            }
        }
    }

    log::info!(
        "resolved {} of {} landmarks around {}",
        resolution.candidates.len(),
        names.len(),
        anchor.name
    );
    resolution
}

fn check(
    name: &str,
    anchor: &CityAnchor,
    area: &SearchArea,
    lookup: &dyn PlaceLookup,
) -> Result<Candidate, SkipReason> {
    let point = match lookup.locate(name, anchor) {
        Ok(point) => point,
        Err(Error::LookupMiss(_)) => return Err(SkipReason::NotFound),
        Err(e) => return Err(SkipReason::LookupFailed(e.to_string())),
    };

    if let Some(radius_km) = area.radius_km {
        let distance_km = geodesic_distance_km(anchor.coordinates(), point);
        log::debug!("'{name}' is {distance_km:.2} km from {}", anchor.name);
        if distance_km > radius_km {
            return Err(SkipReason::OutsideRadius { distance_km });
        }
    }

    if area.within_bounding_box
        && let Some(bbox) = &anchor.bounding_box
        && !bbox.contains(point)
    {
        return Err(SkipReason::OutsideBoundingBox);
    }

    Ok(Candidate::new(name, point))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use geo::{Destination, Geodesic, Point};
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::Result;
    use crate::model::{BoundingBox, Coordinates};

    struct FixedLookup(HashMap<String, Result<Option<Coordinates>>>);

    impl FixedLookup {
        fn new(entries: Vec<(&str, Result<Option<Coordinates>>)>) -> Self {
            Self(
                entries
                    .into_iter()
                    .map(|(name, result)| (name.to_string(), result))
                    .collect(),
            )
        }
    }

    impl PlaceLookup for FixedLookup {
        fn lookup(&self, query: &str, _anchor: &CityAnchor) -> Result<Option<Coordinates>> {
            match self.0.get(query) {
                Some(Ok(point)) => Ok(*point),
                Some(Err(_)) => Err(Error::Status {
                    service: "place lookup",
                    status: 429,
                }),
                None => Ok(None),
            }
        }
    }

    fn paris() -> CityAnchor {
        CityAnchor::new("Paris, France", 2.3522, 48.8566)
    }

    /// Point `km` kilometres east of the anchor.
    fn east_of(anchor: &CityAnchor, km: f64) -> Coordinates {
        let point = Geodesic.destination(
            Point::new(anchor.longitude, anchor.latitude),
            90.0,
            km * 1000.0,
        );
        (point.x(), point.y())
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn keeps_near_and_drops_far() {
        let anchor = paris();
        let lookup = FixedLookup::new(vec![
            ("Far", Ok(Some(east_of(&anchor, 9.0)))),
            ("Near", Ok(Some(east_of(&anchor, 3.0)))),
        ]);

        let resolution = resolve_with_report(
            &names(&["Far", "Near"]),
            &anchor,
            &SearchArea::radius(7.0),
            &lookup,
        );

        assert_eq!(resolution.candidates.len(), 1);
        assert_eq!(resolution.candidates[0].name, "Near");
        assert!(resolution.candidates[0].include);
        assert_eq!(resolution.skipped.len(), 1);
        match resolution.skipped[0].reason {
            SkipReason::OutsideRadius { distance_km } => assert!((distance_km - 9.0).abs() < 0.01),
            ref other => panic!("unexpected reason {other:?}"),
        }
    }

    #[test]
    fn misses_and_failures_are_skipped_not_fatal() {
        let anchor = paris();
        let lookup = FixedLookup::new(vec![
            ("Louvre", Ok(Some((2.3376, 48.8606)))),
            ("Rate limited", Err(Error::other("429"))),
            ("Orsay", Ok(Some((2.3266, 48.8600)))),
        ]);

        let resolution = resolve_with_report(
            &names(&["Louvre", "Unknown", "Rate limited", "Orsay"]),
            &anchor,
            &SearchArea::radius(7.0),
            &lookup,
        );

        let kept: Vec<&str> = resolution.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(kept, vec!["Louvre", "Orsay"]);
        assert_eq!(resolution.skipped[0].reason, SkipReason::NotFound);
        assert!(matches!(resolution.skipped[1].reason, SkipReason::LookupFailed(_)));
    }

    #[test]
    fn preserves_input_order_and_duplicates() {
        let anchor = paris();
        let lookup = FixedLookup::new(vec![
            ("Eiffel Tower", Ok(Some((2.2945, 48.8584)))),
            ("Louvre", Ok(Some((2.3376, 48.8606)))),
        ]);

        let candidates = resolve(
            &names(&["Eiffel Tower", "Louvre", "Eiffel Tower"]),
            &anchor,
            &SearchArea::radius(7.0),
            &lookup,
        );

        let kept: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(kept, vec!["Eiffel Tower", "Louvre", "Eiffel Tower"]);
    }

    #[test]
    fn bounding_box_and_radius_both_apply() {
        let anchor = paris().with_bounding_box(BoundingBox::new(2.22, 48.81, 2.40, 48.90));
        let lookup = FixedLookup::new(vec![
            // inside the radius, east of the box
            ("Vincennes", Ok(Some((2.4390, 48.8448)))),
            ("Louvre", Ok(Some((2.3376, 48.8606)))),
        ]);
        let area = SearchArea {
            radius_km: Some(7.0),
            within_bounding_box: true,
        };

        let resolution =
            resolve_with_report(&names(&["Vincennes", "Louvre"]), &anchor, &area, &lookup);

        assert_eq!(resolution.candidates.len(), 1);
        assert_eq!(resolution.skipped[0].reason, SkipReason::OutsideBoundingBox);

        let unbounded = resolve(&names(&["Vincennes"]), &anchor, &SearchArea::radius(7.0), &lookup);
        assert_eq!(unbounded.len(), 1);
    }

    #[test]
    fn no_constraints_accepts_every_hit() {
        let anchor = paris();
        let lookup = FixedLookup::new(vec![("Versailles", Ok(Some((2.1204, 48.8049))))]);
        let area = SearchArea {
            radius_km: None,
            within_bounding_box: true,
        };
        assert_eq!(resolve(&names(&["Versailles"]), &anchor, &area, &lookup).len(), 1);
    }

    #[test_log::test]
    fn accepted_candidates_lie_within_radius() {
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..50 {
            let anchor = CityAnchor::new(
                "random",
                rng.random_range(-170.0..170.0),
                rng.random_range(-70.0..70.0),
            );
            let radius_km = rng.random_range(1.0..20.0);
            let entries: Vec<(String, Coordinates)> = (0..12)
                .map(|i| {
                    let point = (
                        anchor.longitude + rng.random_range(-0.4..0.4),
                        anchor.latitude + rng.random_range(-0.4..0.4),
                    );
                    (format!("landmark {i}"), point)
                })
                .collect();
            let lookup = FixedLookup(
                entries
                    .iter()
                    .map(|(name, point)| (name.clone(), Ok(Some(*point))))
                    .collect(),
            );
            let queries: Vec<String> = entries.iter().map(|(name, _)| name.clone()).collect();

            let resolution =
                resolve_with_report(&queries, &anchor, &SearchArea::radius(radius_km), &lookup);

            assert_eq!(
                resolution.candidates.len() + resolution.skipped.len(),
                queries.len()
            );
            for candidate in &resolution.candidates {
                let distance = geodesic_distance_km(anchor.coordinates(), candidate.coordinates());
                assert!(distance <= radius_km, "{distance} > {radius_km}");
            }
        }
    }
}
