//! View state of the weather panels.

/// Lifecycle of one selection as seen by the loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Rendered,
    Failed,
}

impl ViewState {
    pub fn shows_indicator(self) -> bool {
        matches!(self, ViewState::Loading)
    }

    /// State once an orchestration has finished, whatever the outcome.
    pub fn on_finished(self, obtained_any: bool) -> Self {
        if obtained_any {
            ViewState::Rendered
        } else {
            ViewState::Failed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Heading(String),
    Block { title: String, body: String },
}

/// Ordered display fragments for one panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    fragments: Vec<Fragment>,
}

impl Panel {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn replace(&mut self, fragments: Vec<Fragment>) {
        self.fragments = fragments;
    }

    /// Block fragments only, in order.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Block { title, body } => Some((title.as_str(), body.as_str())),
            Fragment::Heading(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_loading_shows_indicator() {
        assert!(ViewState::Loading.shows_indicator());
        assert!(!ViewState::Idle.shows_indicator());
        assert!(!ViewState::Rendered.shows_indicator());
        assert!(!ViewState::Failed.shows_indicator());
    }

    #[test]
    fn test_finishing_always_leaves_loading() {
        assert_eq!(ViewState::Loading.on_finished(true), ViewState::Rendered);
        assert_eq!(ViewState::Loading.on_finished(false), ViewState::Failed);
        assert!(!ViewState::Loading.on_finished(false).shows_indicator());
    }

    #[test]
    fn test_blocks_skip_headings() {
        let mut panel = Panel::default();
        panel.push(Fragment::Heading("Active Alerts".into()));
        panel.push(Fragment::Block {
            title: "a".into(),
            body: "b".into(),
        });
        assert_eq!(panel.blocks().collect::<Vec<_>>(), vec![("a", "b")]);
    }
}
