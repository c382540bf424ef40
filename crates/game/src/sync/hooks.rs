/// Timing handed to post-draw hooks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HookContext {
    pub time: f64,
    pub client_time: f64,
    pub server_time: f64,
    pub net_latency: f64,
    pub net_ping: f64,
}

pub type HookFn = Box<dyn FnMut(&HookContext)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookToken(u64);

struct Hook {
    token: HookToken,
    name: String,
    listener: HookFn,
}

/// Named listeners run after every draw, in registration order.
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Hook>,
    next_token: u64,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering an existing name replaces its listener in place and keeps its
    /// token.
    pub fn register(&mut self, name: impl Into<String>, listener: HookFn) -> HookToken {
        let name = name.into();
        if let Some(hook) = self.hooks.iter_mut().find(|h| h.name == name) {
            hook.listener = listener;
            return hook.token;
        }

        let token = HookToken(self.next_token);
        self.next_token += 1;
        self.hooks.push(Hook {
            token,
            name,
            listener,
        });
        token
    }

    pub fn unregister(&mut self, token: HookToken) -> bool {
        match self.hooks.iter().position(|h| h.token == token) {
            Some(index) => {
                let hook = self.hooks.remove(index);
                log::debug!("Removed hook {}", hook.name);
                true
            }
            None => false,
        }
    }

    pub fn unregister_named(&mut self, name: &str) -> bool {
        match self.hooks.iter().position(|h| h.name == name) {
            Some(index) => self.unregister(self.hooks[index].token),
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.iter().any(|h| h.name == name)
    }

    pub fn run(&mut self, context: &HookContext) {
        for hook in &mut self.hooks {
            (hook.listener)(context);
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> HookFn {
        let log = Rc::clone(log);
        Box::new(move |_| log.borrow_mut().push(label.to_string()))
    }

    #[test]
    fn runs_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = HookRegistry::new();
        hooks.register("a", recorder(&log, "a"));
        hooks.register("b", recorder(&log, "b"));

        hooks.run(&HookContext::default());

        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn same_name_overwrites() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = HookRegistry::new();
        let first = hooks.register("stats", recorder(&log, "old"));
        let second = hooks.register("stats", recorder(&log, "new"));

        assert_eq!(first, second);
        assert_eq!(hooks.len(), 1);

        hooks.run(&HookContext::default());
        assert_eq!(*log.borrow(), vec!["new"]);
    }

    #[test]
    fn removal_by_token_and_name() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = HookRegistry::new();
        let a = hooks.register("a", recorder(&log, "a"));
        hooks.register("b", recorder(&log, "b"));

        assert!(hooks.unregister(a));
        assert!(!hooks.unregister(a));
        assert!(hooks.unregister_named("b"));
        assert!(hooks.is_empty());

        hooks.run(&HookContext::default());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn hooks_receive_context() {
        let seen = Rc::new(RefCell::new(None));
        let mut hooks = HookRegistry::new();
        let sink = Rc::clone(&seen);
        hooks.register(
            "ctx",
            Box::new(move |ctx: &HookContext| *sink.borrow_mut() = Some(*ctx)),
        );

        let context = HookContext {
            time: 1.0,
            client_time: 2.0,
            server_time: 3.0,
            net_latency: 0.05,
            net_ping: 0.1,
        };
        hooks.run(&context);

        assert_eq!(*seen.borrow(), Some(context));
    }
}
