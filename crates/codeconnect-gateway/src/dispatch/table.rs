//! Static route table with longest-prefix-first matching.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    EventBridge,
    Chat,
    Sessions,
    Root,
    Health,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::EventBridge => "event_bridge",
            RouteKind::Chat => "chat",
            RouteKind::Sessions => "sessions",
            RouteKind::Root => "root",
            RouteKind::Health => "health",
        }
    }

    /// Routes served by a registered handler group rather than a built-in.
    pub fn is_group(self) -> bool {
        matches!(
            self,
            RouteKind::EventBridge | RouteKind::Chat | RouteKind::Sessions
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// Path equals the pattern (a single trailing slash is tolerated).
    Exact(&'static str),
    /// Path equals the prefix or continues with `/`.
    Prefix(&'static str),
}

impl Pattern {
    fn text(self) -> &'static str {
        match self {
            Pattern::Exact(p) | Pattern::Prefix(p) => p,
        }
    }

    fn matches(self, path: &str) -> bool {
        match self {
            Pattern::Exact("/") => path == "/",
            Pattern::Exact(p) => path == p || path.strip_suffix('/') == Some(p),
            Pattern::Prefix(p) => path
                .strip_prefix(p)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<(Pattern, RouteKind)>,
}

impl RouteTable {
    /// The gateway's route table.
    pub fn standard() -> Self {
        let mut entries = vec![
            (Pattern::Prefix("/api/event-bridge"), RouteKind::EventBridge),
            (Pattern::Prefix("/api/chat"), RouteKind::Chat),
            (Pattern::Prefix("/api/sessions"), RouteKind::Sessions),
            (Pattern::Exact("/health"), RouteKind::Health),
            (Pattern::Exact("/"), RouteKind::Root),
        ];
        // Longest pattern first; stable sort keeps declaration order on ties.
        entries.sort_by(|a, b| b.0.text().len().cmp(&a.0.text().len()));
        Self { entries }
    }

    pub fn resolve(&self, path: &str) -> Option<RouteKind> {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, kind)| *kind)
    }

    /// Route kinds that need a registered handler group.
    pub fn group_routes(&self) -> impl Iterator<Item = RouteKind> + '_ {
        self.entries
            .iter()
            .map(|(_, kind)| *kind)
            .filter(|k| k.is_group())
    }
}
