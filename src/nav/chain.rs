//! Declarative multi-step transitions
//!
//! A [`NavigationChain`] is an ordered batch of navigation operations applied
//! against the same history snapshot and dispatched as one transition, so a
//! sequence like "replace the current screen and also show a modal" never
//! produces intermediate dispatch cycles.

use crate::screen::ScreenPath;

/// One step of a chain
///
/// Steps that navigate somewhere carry their destination; `Back` and
/// `BackToRoot` never do. The variants make the "no path" case unrepresentable
/// instead of signalling it with an absent value.
#[derive(Debug, Clone)]
pub enum ChainStep {
    /// Append the path as a regular stack frame
    Push(ScreenPath),
    /// Kill the current top, then append the path
    Replace(ScreenPath),
    /// Kill the current top if the stack can shrink
    Back,
    /// Kill everything but the root
    BackToRoot,
}

/// Ordered list of steps applied atomically as one transition
#[derive(Debug, Clone, Default)]
pub struct NavigationChain {
    steps: Vec<ChainStep>,
}

impl NavigationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, path: ScreenPath) -> Self {
        self.steps.push(ChainStep::Push(path));
        self
    }

    pub fn replace(mut self, path: ScreenPath) -> Self {
        self.steps.push(ChainStep::Replace(path));
        self
    }

    pub fn back(mut self) -> Self {
        self.steps.push(ChainStep::Back);
        self
    }

    pub fn back_to_root(mut self) -> Self {
        self.steps.push(ChainStep::BackToRoot);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<ChainStep> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Screen;

    struct Named(&'static str);

    impl Screen for Named {
        fn screen_type(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn builder_keeps_step_order() {
        let chain = NavigationChain::new()
            .push(ScreenPath::new(Named("a")))
            .replace(ScreenPath::new(Named("b")))
            .back()
            .back_to_root();

        assert_eq!(chain.len(), 4);
        assert!(matches!(chain.steps()[0], ChainStep::Push(_)));
        assert!(matches!(chain.steps()[1], ChainStep::Replace(_)));
        assert!(matches!(chain.steps()[2], ChainStep::Back));
        assert!(matches!(chain.steps()[3], ChainStep::BackToRoot));
    }

    #[test]
    fn new_chain_is_empty() {
        assert!(NavigationChain::new().is_empty());
    }
}
