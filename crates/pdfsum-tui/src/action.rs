/// User-level actions produced by input mapping and consumed by `App::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Tick,
    Resize(u16, u16),

    // Navigation
    MoveDown,
    MoveUp,
    PageDown,
    PageUp,
    GoTop,
    GoBottom,
    DrillIn,
    NavigateBack,

    // Document
    OpenFilePicker,
    Summarize,
    CopyText,
    CopySummary,

    ToggleHelp,
}
