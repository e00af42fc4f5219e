/// Per-subsystem log tags
///
/// Each tag maps to a `--debug-<tag>` command-line flag so diagnostic
/// output can be enabled per module.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Cache,
    Coordinator,
    Sources,
    Refresher,
    System,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Cache => "CACHE",
            LogTag::Coordinator => "COORD",
            LogTag::Sources => "SOURCES",
            LogTag::Refresher => "REFRESH",
            LogTag::System => "SYSTEM",
        }
    }

    /// Key used for the --debug-<key> command-line flag
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::Cache => "cache",
            LogTag::Coordinator => "coordinator",
            LogTag::Sources => "sources",
            LogTag::Refresher => "refresher",
            LogTag::System => "system",
        }
    }
}
