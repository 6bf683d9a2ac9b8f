/// Decides when the case list needs refreshing after submission activity.
///
/// A refresh is due when a submission stops loading, and when the reported
/// case status changes while nothing is loading.
#[derive(Debug, Clone, Default)]
pub struct CaseRefreshTracker {
    was_loading: bool,
    last_status: Option<String>,
}

impl CaseRefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest loading flag and case status. Returns whether the
    /// case list should be refreshed now.
    pub fn observe(&mut self, is_loading: bool, case_status: Option<&str>) -> bool {
        let finished = self.was_loading && !is_loading;
        let status_changed = match case_status {
            Some(status) if self.last_status.as_deref() != Some(status) => {
                self.last_status = Some(status.to_string());
                true
            }
            _ => false,
        };
        self.was_loading = is_loading;

        finished || (status_changed && !is_loading)
    }
}
