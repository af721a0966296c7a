use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub searches: usize,
    pub expanded_states: usize,
    pub pushed_states: usize,
    pub reachability_probes: usize,
    pub time_us: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Searches {:?} Probes {:?} Expanded {:?} Pushed {:?} Time(us) {:?}",
            self.searches,
            self.reachability_probes,
            self.expanded_states,
            self.pushed_states,
            self.time_us
        );
    }
}
