//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::state::Popup;

/// Application tabs
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AppTab {
    #[default]
    Purchases,
    Clients,
    Products,
    Freight,
    Settings,
}

impl AppTab {
    pub const ALL: [AppTab; 5] = [
        AppTab::Purchases,
        AppTab::Clients,
        AppTab::Products,
        AppTab::Freight,
        AppTab::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AppTab::Purchases => "Compras",
            AppTab::Clients => "Clientes",
            AppTab::Products => "Produtos",
            AppTab::Freight => "Frete",
            AppTab::Settings => "Config",
        }
    }

    pub fn index(&self) -> usize {
        AppTab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> AppTab {
        AppTab::ALL[(self.index() + 1) % AppTab::ALL.len()]
    }
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Tab navigation
    SwitchTab(AppTab),
    NextTab,

    // List navigation
    Up,
    Down,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    NextField,
    PrevField,

    // Purchases
    CycleStatusFilter,
    ToggleSelect,
    ToggleSelectAll,
    ToggleExpand,
    MarkPaid,
    RequestCancel,
    GenerateLabel,
    GenerateLabels,
    PrintLabels,
    StartPayment,
    StopPayment,
    RefreshTracking,
    EditPurchase,
    Reload,

    // Clients
    CycleActiveFilter,
    NewClient,
    EditClient,
    RequestDeactivate,
    NewPurchase,

    // Client form and purchase draft
    Submit,
    DraftAdd,
    DraftRemove,
    DraftQuote,
    DraftNextOption,

    // Freight calculator
    QuoteFreight,

    // Settings
    CycleTheme,
    SaveSettings,

    // Popups
    Confirm,
    Dismiss,
    ToggleHelp,

    // System
    Quit,
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_tab: AppTab,
    input_mode: InputMode,
    popup: Option<Popup>,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('s') if popup == Some(Popup::ClientForm) => return Some(UiEvent::Submit),
            _ => {}
        }
    }

    // Handle popups first (same for all tabs)
    if let Some(popup) = popup {
        return handle_popup_keys(key, popup);
    }

    if input_mode == InputMode::Editing {
        return handle_editing_keys(key, active_tab);
    }

    // Tab switching (only in normal mode, not editing)
    match key.code {
        KeyCode::Char('1') => return Some(UiEvent::SwitchTab(AppTab::Purchases)),
        KeyCode::Char('2') => return Some(UiEvent::SwitchTab(AppTab::Clients)),
        KeyCode::Char('3') => return Some(UiEvent::SwitchTab(AppTab::Products)),
        KeyCode::Char('4') => return Some(UiEvent::SwitchTab(AppTab::Freight)),
        KeyCode::Char('5') => return Some(UiEvent::SwitchTab(AppTab::Settings)),
        KeyCode::Tab => return Some(UiEvent::NextTab),
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Up | KeyCode::Char('k') => return Some(UiEvent::Up),
        KeyCode::Down | KeyCode::Char('j') => return Some(UiEvent::Down),
        _ => {}
    }

    // Tab-specific key handling
    match active_tab {
        AppTab::Purchases => handle_purchases_keys(key),
        AppTab::Clients => handle_clients_keys(key),
        AppTab::Products => match key.code {
            KeyCode::Char('r') => Some(UiEvent::Reload),
            _ => None,
        },
        AppTab::Freight => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
            KeyCode::Char('s') => Some(UiEvent::QuoteFreight),
            _ => None,
        },
        AppTab::Settings => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
            KeyCode::Char('t') => Some(UiEvent::CycleTheme),
            KeyCode::Char('s') => Some(UiEvent::SaveSettings),
            _ => None,
        },
    }
}

/// Handle keys for the purchases tab
fn handle_purchases_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('f') => Some(UiEvent::CycleStatusFilter),
        KeyCode::Char('/') => Some(UiEvent::StartEditing),
        KeyCode::Char(' ') => Some(UiEvent::ToggleSelect),
        KeyCode::Char('a') => Some(UiEvent::ToggleSelectAll),
        KeyCode::Enter => Some(UiEvent::ToggleExpand),
        KeyCode::Char('p') => Some(UiEvent::MarkPaid),
        KeyCode::Char('x') => Some(UiEvent::RequestCancel),
        KeyCode::Char('g') => Some(UiEvent::GenerateLabel),
        KeyCode::Char('G') => Some(UiEvent::GenerateLabels),
        KeyCode::Char('P') => Some(UiEvent::PrintLabels),
        KeyCode::Char('$') => Some(UiEvent::StartPayment),
        KeyCode::Esc => Some(UiEvent::StopPayment),
        KeyCode::Char('t') => Some(UiEvent::RefreshTracking),
        KeyCode::Char('e') => Some(UiEvent::EditPurchase),
        KeyCode::Char('r') => Some(UiEvent::Reload),
        _ => None,
    }
}

/// Handle keys for the clients tab
fn handle_clients_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('f') => Some(UiEvent::CycleActiveFilter),
        KeyCode::Char('/') => Some(UiEvent::StartEditing),
        KeyCode::Char('n') => Some(UiEvent::NewClient),
        KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::EditClient),
        KeyCode::Char('d') => Some(UiEvent::RequestDeactivate),
        KeyCode::Char('c') => Some(UiEvent::NewPurchase),
        KeyCode::Char('r') => Some(UiEvent::Reload),
        _ => None,
    }
}

/// Text entry on the search boxes, the freight form and the settings URL
fn handle_editing_keys(key: KeyEvent, active_tab: AppTab) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Enter if active_tab == AppTab::Freight => Some(UiEvent::QuoteFreight),
        KeyCode::Enter => Some(UiEvent::StopEditing),
        KeyCode::Tab => Some(UiEvent::NextField),
        KeyCode::BackTab => Some(UiEvent::PrevField),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

fn handle_popup_keys(key: KeyEvent, popup: Popup) -> Option<UiEvent> {
    match popup {
        Popup::Help => Some(UiEvent::Dismiss),
        Popup::ConfirmCancel(_) | Popup::ConfirmDeactivate(_) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('s') | KeyCode::Enter => Some(UiEvent::Confirm),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::Dismiss),
            _ => None,
        },
        Popup::ClientForm => match key.code {
            KeyCode::Esc => Some(UiEvent::Dismiss),
            KeyCode::Enter => Some(UiEvent::Submit),
            KeyCode::Tab | KeyCode::Down => Some(UiEvent::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(UiEvent::PrevField),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            _ => None,
        },
        Popup::PurchaseDraft => match key.code {
            KeyCode::Esc => Some(UiEvent::Dismiss),
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::Down),
            KeyCode::Char('+') | KeyCode::Char('a') => Some(UiEvent::DraftAdd),
            KeyCode::Char('-') | KeyCode::Char('d') => Some(UiEvent::DraftRemove),
            KeyCode::Char('f') => Some(UiEvent::DraftQuote),
            KeyCode::Char('o') => Some(UiEvent::DraftNextOption),
            KeyCode::Char('s') | KeyCode::Enter => Some(UiEvent::Submit),
            _ => None,
        },
    }
}
