use logdeck_types::Severity;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    GoBack,
    Quit,

    // UI toggles
    ToggleHelp,
    ToggleFocus,

    // Row selection
    SelectUp,
    SelectDown,
    PageUp,
    PageDown,
    SelectFirst,
    SelectLast,
    ToggleFollow,
    JumpToOrigin,

    // Mouse (terminal column, row)
    Click(u16, u16),

    // Stack trace pane
    FrameUp,
    FrameDown,
    OpenFrame,

    // Filters
    ToggleCollapse,
    ToggleSeverity(Severity),
    ChannelPrev,
    ChannelNext,
    ToggleChannel,
    EnableAllChannels,

    // Search
    OpenSearch,
    CloseSearch,
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    ApplySearch,
    ClearSearch,

    // Store
    ClearLogs,

    // Notices from sinks and errors
    ShowNotice(String),
    DismissNotice,

    // Tick (for periodic updates)
    Tick,

    // Render request
    Render,
}
