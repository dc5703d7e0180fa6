//! Pink Bella CRM - Actor-based operator console
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async calls to the backend

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use bella_crm::app::state::{ClientField, FreightField, Popup, StatusKind};
use bella_crm::app::{AppActor, AppState};
use bella_crm::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME, VIACEP_URL};
use bella_crm::messages::ui_events::{key_to_ui_event, AppTab, InputMode};
use bella_crm::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use bella_crm::network::{ApiClient, NetworkActor};
use bella_crm::storage::Storage;
use bella_crm::ui::{self, centered_rect, format_brl, format_timestamp, palette, status_color, Palette};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE_NAME);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let storage = Storage::new();
    let api_url = storage.api_base_url();
    tracing::info!(version = APP_VERSION, api = %api_url, "Starting {}", APP_NAME);
    let api = Arc::new(ApiClient::with_cep_url(api_url, VIACEP_URL));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _terminal_guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(api, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(AppState::new(storage), net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_tab,
                    current_state.input_mode,
                    current_state.popup,
                ) {
                    if matches!(event, UiEvent::Quit) {
                        let _ = ui_tx.send(event);
                        break;
                    }
                    let _ = ui_tx.send(event);
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();
    let p = palette(state.theme);

    // Main layout with tab bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status message
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    draw_tab_bar(f, state, &p, main_chunks[0]);

    match state.active_tab {
        AppTab::Purchases => draw_purchases_tab(f, state, &p, main_chunks[1]),
        AppTab::Clients => draw_clients_tab(f, state, &p, main_chunks[1]),
        AppTab::Products => draw_products_tab(f, state, &p, main_chunks[1]),
        AppTab::Freight => draw_freight_tab(f, state, &p, main_chunks[1]),
        AppTab::Settings => draw_settings_tab(f, state, &p, main_chunks[1]),
    }

    draw_status_line(f, state, &p, main_chunks[2]);
    draw_hints(f, state, &p, main_chunks[3]);

    match state.popup {
        Some(Popup::Help) => draw_help_popup(f, &p, area),
        Some(Popup::ConfirmCancel(id)) => draw_confirm_popup(
            f,
            &p,
            area,
            &format!("Cancel purchase #{}? (y/n)", id),
        ),
        Some(Popup::ConfirmDeactivate(id)) => draw_confirm_popup(
            f,
            &p,
            area,
            &format!("Toggle active flag of client #{}? (y/n)", id),
        ),
        Some(Popup::ClientForm) => draw_client_form(f, state, &p, area),
        Some(Popup::PurchaseDraft) => draw_draft_popup(f, state, &p, area),
        None => {}
    }
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let titles: Vec<String> = AppTab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| format!(" {}:{} ", i + 1, tab.title()))
        .collect();
    let titles: Vec<&str> = titles.iter().map(String::as_str).collect();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(28)])
        .split(area);

    f.render_widget(ui::render_tabs(&titles, state.active_tab.index(), p), chunks[0]);

    let payment = if state.payment.active { " [PIX]" } else { "" };
    let brand = Paragraph::new(format!("{}{} ", APP_NAME, payment))
        .style(Style::default().fg(p.accent).bold())
        .alignment(Alignment::Right);
    f.render_widget(brand, chunks[1]);
}

fn focused_border(p: &Palette, focused: bool, editing: bool) -> Style {
    if focused && editing {
        Style::default().fg(p.highlight)
    } else if focused {
        Style::default().fg(p.accent)
    } else {
        Style::default().fg(p.muted)
    }
}

fn set_cursor(f: &mut Frame, area: Rect, cursor: usize) {
    let max_x = area.x + area.width.saturating_sub(2);
    let cursor_x = (area.x + cursor as u16 + 1).min(max_x);
    f.set_cursor_position(Position::new(cursor_x, area.y + 1));
}

// ========================
// Purchases
// ========================

fn draw_purchases_tab(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter + search
            Constraint::Length(1), // Counts
            Constraint::Min(5),    // List + side panel
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(10)])
        .split(chunks[0]);

    let filter = Paragraph::new(state.purchase_filter_label.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .title(" Status (f) "),
    );
    f.render_widget(filter, top[0]);

    let editing = state.input_mode == InputMode::Editing;
    let search = Paragraph::new(state.search.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused_border(p, editing, editing))
            .title(" Buscar nome / CPF / # (/) "),
    );
    f.render_widget(search, top[1]);
    if editing {
        set_cursor(f, top[1], state.search.cursor);
    }

    let mut counts: Vec<Span> = vec![Span::styled(
        format!(" {} compras ", state.purchase_total),
        Style::default().fg(p.text).bold(),
    )];
    for (status, n) in &state.purchase_counts {
        let color = status_color(&bella_crm::PurchaseStatus::from(status.as_str()));
        counts.push(Span::styled(format!(" {}: {} ", status, n), Style::default().fg(color)));
    }
    if !state.selected.is_empty() {
        counts.push(Span::styled(
            format!(" | {} selecionada(s)", state.selected.len()),
            Style::default().fg(p.highlight),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(counts)), chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(44)])
        .split(chunks[2]);

    draw_purchase_list(f, state, p, body[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(body[1]);
    draw_wallet_panel(f, state, p, side[0]);
    draw_purchase_detail(f, state, p, side[1]);
}

fn draw_purchase_list(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let rows: Vec<Row> = state
        .purchases
        .iter()
        .map(|purchase| {
            let mark = if state.selected.contains(&purchase.id) { "[x]" } else { "[ ]" };
            let pending = if state.pending.contains(&purchase.id) { " …" } else { "" };
            let date = purchase
                .purchased_at_utc()
                .map(format_timestamp)
                .unwrap_or_else(|| String::from("-"));
            Row::new(vec![
                Cell::from(mark),
                Cell::from(format!("#{}{}", purchase.id, pending)),
                Cell::from(date),
                Cell::from(purchase.client_name().unwrap_or("-").to_string()),
                Cell::from(purchase.status.to_string())
                    .style(Style::default().fg(status_color(&purchase.status))),
                Cell::from(format_brl(purchase.total)),
                Cell::from(purchase.label_code().unwrap_or("").to_string()),
            ])
        })
        .collect();

    let loading = if state.loading_purchases { " [...]" } else { "" };
    let loaded = state
        .loaded_at
        .map(|at| format!(" atualizado {} ", format_timestamp(at)))
        .unwrap_or_default();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Min(12),
            Constraint::Length(20),
            Constraint::Length(13),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["", "#", "Data", "Cliente", "Status", "Total", "Etiqueta"])
            .style(Style::default().fg(p.accent_alt).bold()),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .title(format!(" Compras{} ", loading))
            .title_bottom(Line::from(loaded).right_aligned()),
    )
    .row_highlight_style(Style::default().fg(p.highlight).bold());

    let mut table_state = TableState::default();
    if !state.purchases.is_empty() {
        table_state.select(Some(state.purchase_cursor));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_wallet_panel(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let mut lines = Vec::new();
    match &state.wallet {
        Some(wallet) => {
            let color = if wallet.covers_cart() { Color::Green } else { Color::Red };
            lines.push(Line::from(vec![
                Span::raw("Saldo:    "),
                Span::styled(format_brl(wallet.balance), Style::default().fg(color).bold()),
            ]));
            lines.push(Line::from(format!("Carrinho: {}", format_brl(wallet.cart_total))));
        }
        None => lines.push(Line::from(Span::styled("Saldo indisponível", Style::default().fg(p.muted)))),
    }

    if let Some(pix) = &state.payment.pix {
        lines.push(Line::from(Span::styled(
            format!("PIX {}", format_brl(pix.amount)),
            Style::default().fg(p.highlight).bold(),
        )));
        lines.push(Line::from(pix.copy_paste_code.clone()));
        lines.push(Line::from(Span::styled(pix.qr_code_url.clone(), Style::default().fg(p.muted))));
    }
    if state.payment.active {
        lines.push(Line::from(format!("Aguardando... verificação {}", state.payment.attempts)));
    }
    if let Some(err) = &state.payment.last_error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
    }

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.accent_alt))
                .title(" Melhor Envio ($ pagar) "),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

fn draw_purchase_detail(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.muted))
        .title(" Detalhes (Enter) ");

    let current = state.purchases.get(state.purchase_cursor);
    let Some(purchase) = current.filter(|c| state.expanded == Some(c.id)) else {
        let hint = Paragraph::new(Span::styled(
            "Enter mostra itens e frete",
            Style::default().fg(p.muted),
        ))
        .block(block);
        f.render_widget(hint, area);
        return;
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("Compra #{}", purchase.id),
        Style::default().fg(p.accent).bold(),
    ))];
    if let Some(doc) = purchase.client_document() {
        lines.push(Line::from(format!("CPF: {}", doc)));
    }
    for item in &purchase.items {
        lines.push(Line::from(format!(
            "{} x{}  {}",
            item.display_name(),
            item.quantity,
            format_brl(item.subtotal())
        )));
    }
    if let Some(freight) = &purchase.freight {
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "Frete: {} {} {}",
            freight.carrier.as_deref().unwrap_or("-"),
            freight.service.as_deref().unwrap_or(""),
            format_brl(freight.price)
        )));
        if let Some(days) = freight.lead_time_days {
            lines.push(Line::from(format!("Prazo: {} dia(s)", days)));
        }
    }
    if let Some(code) = purchase.tracking_code() {
        lines.push(Line::from(format!("Rastreio: {}", code)));
    }
    if let Some(url) = &state.last_print_url {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("PDF: {}", url), Style::default().fg(p.highlight))));
    }

    let detail = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(detail, area);
}

// ========================
// Clients
// ========================

fn draw_clients_tab(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(10)])
        .split(chunks[0]);

    let stats = state.client_stats;
    let header = Paragraph::new(format!(
        "{} | {} ativos, {} inativos, {} exibidos",
        state.client_filter_label, stats.active, stats.inactive, stats.shown
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .title(format!(" {} clientes (f) ", stats.total)),
    );
    f.render_widget(header, top[0]);

    let editing = state.input_mode == InputMode::Editing && state.popup.is_none();
    let search = ui::render_input(state.client_search.as_str(), " Buscar nome / CPF (/) ", editing, p);
    f.render_widget(search, top[1]);
    if editing {
        set_cursor(f, top[1], state.client_search.cursor);
    }

    let rows: Vec<Row> = state
        .clients
        .iter()
        .map(|client| {
            let style = if client.active {
                Style::default().fg(p.text)
            } else {
                Style::default().fg(p.muted)
            };
            Row::new(vec![
                Cell::from(client.id.map(|id| format!("#{}", id)).unwrap_or_default()),
                Cell::from(client.name.clone()),
                Cell::from(client.document.clone()),
                Cell::from(client.phone.clone()),
                Cell::from(client.address.summary()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(24),
            Constraint::Length(15),
            Constraint::Length(15),
            Constraint::Min(20),
        ],
    )
    .header(
        Row::new(vec!["#", "Nome", "CPF", "Telefone", "Endereço"])
            .style(Style::default().fg(p.accent_alt).bold()),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .title(" Clientes "),
    )
    .row_highlight_style(Style::default().fg(p.highlight).bold());

    let mut table_state = TableState::default();
    if !state.clients.is_empty() {
        table_state.select(Some(state.client_cursor));
    }
    f.render_stateful_widget(table, chunks[1], &mut table_state);
}

fn draw_client_form(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let Some(form) = &state.client_form else {
        return;
    };
    let popup_area = centered_rect(60, 80, area);

    let title = if form.is_new() {
        String::from(" Novo cliente (Enter salva, Esc cancela) ")
    } else {
        format!(" Editar {} (Enter salva, Esc cancela) ", form.original.name)
    };

    let lines: Vec<Line> = ClientField::ALL
        .iter()
        .map(|field| {
            let focused = *field == form.focus;
            let label_style = if focused {
                Style::default().fg(p.highlight).bold()
            } else {
                Style::default().fg(p.accent_alt)
            };
            let mut spans = vec![
                Span::styled(format!("{:>12}: ", field.label()), label_style),
                Span::styled(form.field(*field).value.clone(), Style::default().fg(p.text)),
            ];
            if *field == ClientField::Cep && form.looking_up_cep {
                spans.push(Span::styled("  buscando...", Style::default().fg(p.muted)));
            }
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .title(title)
        .style(Style::default().bg(p.popup_bg));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(lines).block(block), popup_area);

    if let Some(row) = ClientField::ALL.iter().position(|field| *field == form.focus) {
        let cursor = form.field(form.focus).cursor as u16;
        let x = (popup_area.x + 1 + 14 + cursor).min(popup_area.right().saturating_sub(2));
        f.set_cursor_position(Position::new(x, popup_area.y + 1 + row as u16));
    }
}

// ========================
// Purchase draft
// ========================

fn draw_draft_popup(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let Some(draft) = &state.draft else {
        return;
    };
    let popup_area = centered_rect(80, 80, area);
    f.render_widget(Clear, popup_area);

    let title = match draft.editing {
        Some(id) => format!(" Editar compra #{} - {} ", id, draft.client_name),
        None => format!(" Nova compra - {} ", draft.client_name),
    };
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .title(title)
        .title_bottom(Line::from(" +/- item | f cotar frete | o opção | s salvar | Esc fechar ").centered())
        .style(Style::default().bg(p.popup_bg));
    let inner = outer.inner(popup_area);
    f.render_widget(outer, popup_area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    let products: Vec<ListItem> = state
        .products
        .iter()
        .map(|product| ListItem::new(format!("#{} {}  {}", product.id, product.name, format_brl(product.price))))
        .collect();
    let list = List::new(products)
        .block(Block::default().borders(Borders::ALL).title(" Produtos "))
        .highlight_style(Style::default().fg(p.highlight).bold())
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    if !state.products.is_empty() {
        list_state.select(Some(state.product_cursor));
    }
    f.render_stateful_widget(list, cols[0], &mut list_state);

    let mut lines: Vec<Line> = draft
        .lines
        .iter()
        .map(|line| {
            Line::from(format!(
                "{} x{} @ {} = {}",
                line.name,
                line.quantity,
                format_brl(line.unit_price),
                format_brl(line.subtotal())
            ))
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("Nenhum item", Style::default().fg(p.muted))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!("CEP destino: {}", if draft.cep.is_empty() { "-" } else { draft.cep.as_str() })));

    match &draft.quote {
        Some(quote) => {
            for (i, option) in quote.options.iter().enumerate() {
                let style = if i == draft.option_index {
                    Style::default().fg(p.highlight).bold()
                } else {
                    Style::default().fg(p.text)
                };
                lines.push(Line::styled(
                    format!(
                        "{} {} {} - {} ({} dias)",
                        if i == draft.option_index { ">" } else { " " },
                        option.carrier.as_deref().unwrap_or(""),
                        option.service,
                        format_brl(option.price),
                        option.lead_time_days.map(|d| d.to_string()).unwrap_or_else(|| "?".into())
                    ),
                    style,
                ));
            }
        }
        None => lines.push(Line::from(Span::styled("Frete não cotado", Style::default().fg(p.muted)))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!("Itens: {}", format_brl(draft.items_total()))));
    lines.push(Line::from(format!("Frete: {}", format_brl(draft.freight_price()))));
    lines.push(Line::from(Span::styled(
        format!("Total: {}", format_brl(draft.total())),
        Style::default().fg(p.accent).bold(),
    )));

    let summary = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Pedido "))
        .wrap(Wrap { trim: false });
    f.render_widget(summary, cols[1]);
}

// ========================
// Products
// ========================

fn draw_products_tab(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let rows: Vec<Row> = state
        .products
        .iter()
        .map(|product| {
            Row::new(vec![
                format!("#{}", product.id),
                product.name.clone(),
                product.category.clone().unwrap_or_default(),
                format_brl(product.price),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(20),
            Constraint::Length(14),
        ],
    )
    .header(
        Row::new(vec!["#", "Nome", "Categoria", "Preço"]).style(Style::default().fg(p.accent_alt).bold()),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .title(format!(" {} produtos ", state.products.len())),
    )
    .row_highlight_style(Style::default().fg(p.highlight).bold());

    let mut table_state = TableState::default();
    if !state.products.is_empty() {
        table_state.select(Some(state.product_cursor));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

// ========================
// Freight calculator
// ========================

fn draw_freight_tab(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let editing = state.input_mode == InputMode::Editing;
    let form = &state.freight;

    let cep_focus = editing && form.focus == FreightField::Cep;
    f.render_widget(ui::render_input(form.cep.as_str(), " CEP destino ", cep_focus, p), chunks[0]);
    if cep_focus {
        set_cursor(f, chunks[0], form.cep.cursor);
    }

    let items_focus = editing && form.focus == FreightField::Items;
    f.render_widget(
        ui::render_input(form.items.as_str(), " Itens (produto_id:quantidade, ...) ", items_focus, p),
        chunks[1],
    );
    if items_focus {
        set_cursor(f, chunks[1], form.items.cursor);
    }

    let mut lines = Vec::new();
    if form.loading {
        lines.push(Line::from("Cotando..."));
    }
    if let Some(quote) = &form.result {
        if let Some(dest) = &quote.destination {
            lines.push(Line::from(Span::styled(dest.summary(), Style::default().fg(p.accent_alt))));
            lines.push(Line::from(""));
        }
        for option in &quote.options {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<14}", option.carrier.as_deref().unwrap_or("-")),
                    Style::default().fg(p.text).bold(),
                ),
                Span::raw(format!("{:<16}", option.service)),
                Span::raw(format!(
                    "{:>10} dias  ",
                    option.lead_time_days.map(|d| d.to_string()).unwrap_or_else(|| "?".into())
                )),
                Span::styled(format_brl(option.price), Style::default().fg(p.highlight)),
            ]));
        }
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "e: editar | Tab: trocar campo | Enter/s: cotar",
            Style::default().fg(p.muted),
        )));
    }

    let result = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .title(" Opções de frete "),
    );
    f.render_widget(result, chunks[2]);
}

// ========================
// Settings
// ========================

fn draw_settings_tab(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let editing = state.input_mode == InputMode::Editing;
    f.render_widget(ui::render_input(state.settings_url.as_str(), " API URL (e) ", editing, p), chunks[0]);
    if editing {
        set_cursor(f, chunks[0], state.settings_url.cursor);
    }

    let theme = Paragraph::new(state.theme.key()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .title(" Tema (t) "),
    );
    f.render_widget(theme, chunks[1]);

    let info = Paragraph::new(vec![
        Line::from(format!("Configuração: {}", state.config_dir)),
        Line::from(format!("Log: {}", LOG_FILE_NAME)),
        Line::from(format!("{} v{}", APP_NAME, APP_VERSION)),
        Line::from(Span::styled("s: salvar", Style::default().fg(p.muted))),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(p.muted)));
    f.render_widget(info, chunks[2]);
}

// ========================
// Status, hints and popups
// ========================

fn draw_status_line(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let Some(status) = &state.status else {
        return;
    };
    let color = match status.kind {
        StatusKind::Info => p.text,
        StatusKind::Success => Color::Green,
        StatusKind::Warning => Color::Yellow,
        StatusKind::Error => Color::Red,
    };
    f.render_widget(
        Paragraph::new(format!(" {}", status.text)).style(Style::default().fg(color)),
        area,
    );
}

fn draw_hints(f: &mut Frame, state: &RenderState, p: &Palette, area: Rect) {
    let hints = if state.input_mode == InputMode::Editing {
        " Esc:stop editing | arrows:move | Tab:next field "
    } else {
        match state.active_tab {
            AppTab::Purchases => {
                " space:sel a:all p:pago x:cancel g:etiqueta G:lote P:imprimir $:pagar t:rastreio e:editar r:reload ?:help q:quit "
            }
            AppTab::Clients => " n:novo e:editar d:ativar/desativar c:nova compra f:filtro /:buscar ?:help q:quit ",
            AppTab::Products => " ↑/↓:navigate r:reload ?:help q:quit ",
            AppTab::Freight => " e:editar s:cotar ?:help q:quit ",
            AppTab::Settings => " e:editar URL t:tema s:salvar ?:help q:quit ",
        }
    };
    f.render_widget(Paragraph::new(hints).style(Style::default().fg(p.muted)), area);
}

fn draw_confirm_popup(f: &mut Frame, p: &Palette, area: Rect, question: &str) {
    let popup_area = centered_rect(40, 20, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Confirmar ")
        .style(Style::default().bg(p.popup_bg));
    let text = Paragraph::new(question.to_string())
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(Clear, popup_area);
    f.render_widget(text, popup_area);
}

fn draw_help_popup(f: &mut Frame, p: &Palette, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = r#"
 PINK BELLA CRM - Keyboard Shortcuts

 NAVIGATION
   1-5 / Tab          Switch tabs
   ↑ / ↓ (j / k)      Move in lists

 COMPRAS
   f                  Cycle status filter
   /                  Search by name, CPF or #
   space / a          Select one / all visible
   Enter              Show items and freight
   p / x              Mark paid / cancel (asks first)
   g                  Label for the current purchase
   G / P              Generate / print labels of the selection
   $                  Pay cart (PIX if short), Esc stops waiting
   t / r              Refresh tracking / reload

 CLIENTES
   n / e / d          New / edit / toggle active
   c                  New purchase for the client
   CEP field          Tab out to fill the address

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .title(" Help ")
        .style(Style::default().bg(p.popup_bg));

    let help = Paragraph::new(help_text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}
