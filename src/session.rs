//! Session state and the handlers the front end calls on user actions.

use crate::config::Settings;
use crate::model::{CityAnchor, Coordinates};
use crate::narrate::{describe_route, landmark_prompt};
use crate::normalize::normalize;
use crate::reconcile::{ReconciledRoute, reconcile};
use crate::resolve::{Skipped, resolve_with_report};
use crate::selection::SelectionStore;
use crate::services::{PlaceLookup, RouteOptimizer, TextGenerator};
use crate::{Error, Result};

/// Everything one user has picked so far. Choosing a city starts over.
#[derive(Debug, Clone, Default)]
pub struct Session {
    anchor: Option<CityAnchor>,
    store: SelectionStore,
    skipped: Vec<Skipped>,
    route: Option<ReconciledRoute>,
    description: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<&CityAnchor> {
        self.anchor.as_ref()
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    /// Landmarks dropped while building the table, with the reason.
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    pub fn route(&self) -> Option<&ReconciledRoute> {
        self.route.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn start_over(&mut self, anchor: CityAnchor) {
        *self = Self {
            anchor: Some(anchor),
            ..Self::default()
        };
    }

    fn forget_route(&mut self) {
        self.route = None;
        self.description = None;
    }
}

/// Runs the pipeline against a set of external services.
pub struct Planner<'a> {
    settings: &'a Settings,
    text: &'a dyn TextGenerator,
    lookup: &'a dyn PlaceLookup,
    optimizer: &'a dyn RouteOptimizer,
}

impl<'a> Planner<'a> {
    pub fn new(
        settings: &'a Settings,
        text: &'a dyn TextGenerator,
        lookup: &'a dyn PlaceLookup,
        optimizer: &'a dyn RouteOptimizer,
    ) -> Self {
        Self {
            settings,
            text,
            lookup,
            optimizer,
        }
    }

    /// Replace the session with `anchor` and build its landmark table.
    ///
    /// The previous city's table and route are discarded even when this fails.
    pub fn on_city_chosen<'s>(
        &self,
        session: &'s mut Session,
        anchor: CityAnchor,
    ) -> Result<&'s SelectionStore> {
        log::info!("city chosen: {}", anchor.name);
        session.start_over(anchor.clone());

        let max_count = self.settings.landmarks.max_count;
        let raw = self.text.generate(&landmark_prompt(&anchor.name, max_count))?;
        let names = normalize(&raw, max_count)?;

        let resolution = resolve_with_report(
            &names,
            &anchor,
            &self.settings.landmarks.search_area(),
            self.lookup,
        );
        session.store = SelectionStore::new(resolution.candidates);
        session.skipped = resolution.skipped;
        Ok(&session.store)
    }

    pub fn on_inclusion_toggled(
        &self,
        session: &mut Session,
        row: usize,
        value: bool,
    ) -> Result<()> {
        session.store.toggle_include(row, value)?;
        log::debug!("row {row} include = {value}");
        session.forget_route();
        Ok(())
    }

    /// Optimize the included rows. On failure the selection is left as it was
    /// and the user can edit it and try again.
    pub fn on_optimize_requested<'s>(
        &self,
        session: &'s mut Session,
    ) -> Result<&'s ReconciledRoute> {
        if session.anchor.is_none() {
            return Err(Error::NoCity);
        }
        session.forget_route();

        let selected = session.store.selected();
        if selected.len() < 2 {
            return Err(Error::NotEnoughStops(selected.len()));
        }
        let points: Vec<Coordinates> = selected.iter().map(|c| c.coordinates()).collect();

        let optimized = self.optimizer.optimize(&points)?;
        let reconciled = reconcile(&selected, &optimized)?;
        log::info!(
            "route through {} stops, {:.0} m, {} path points",
            reconciled.stops.len(),
            reconciled.total_distance_meters,
            reconciled.geometry.len()
        );
        Ok(session.route.insert(reconciled))
    }

    /// Narrate the last planned route.
    pub fn on_description_requested<'s>(&self, session: &'s mut Session) -> Result<&'s str> {
        let anchor = session.anchor.as_ref().ok_or(Error::NoCity)?;
        let route = session.route.as_ref().ok_or(Error::NoRoute)?;

        let text = describe_route(
            self.text,
            &anchor.name,
            &self.settings.text.activity,
            &route.stops,
        )?;
        Ok(session.description.insert(text).as_str())
    }
}
