use gtk4::prelude::*;

/// Handles for one assistant row that is still waiting for, or currently
/// revealing, its answer.
pub struct MessageRow {
    pub body: gtk4::Label,
    pub spinner: gtk4::Spinner,
}

/// Handles returned from building the chat panel.
pub struct ChatWidgets {
    pub root: gtk4::Box,
    pub list: gtk4::Box,
    pub input: gtk4::Entry,
    pub send_button: gtk4::Button,
}

/// Build the chat panel: a scrolled message list over an input row.
pub fn build_chat_panel() -> ChatWidgets {
    let root = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
    root.set_vexpand(true);

    let list = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
    list.set_valign(gtk4::Align::Start);
    list.set_margin_start(4);
    list.set_margin_end(4);
    list.set_margin_top(6);
    list.set_margin_bottom(6);

    let scroller = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .min_content_height(240)
        .child(&list)
        .build();
    scroller.add_css_class("chat-box");

    // Stick to the bottom. The adjustment's upper bound grows on every
    // appended row and on every revealed character, and `changed` fires
    // each time, so this covers both auto-scroll cases.
    let adjustment = scroller.vadjustment();
    adjustment.connect_changed(|adj| {
        adj.set_value(adj.upper() - adj.page_size());
    });

    let input_row = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    let input = gtk4::Entry::builder()
        .placeholder_text("Ask something about the transcript...")
        .hexpand(true)
        .build();
    let send_button = gtk4::Button::with_label("Send");
    send_button.add_css_class("suggested-action");
    send_button.set_sensitive(false);
    input_row.append(&input);
    input_row.append(&send_button);

    root.append(&scroller);
    root.append(&input_row);

    ChatWidgets {
        root,
        list,
        input,
        send_button,
    }
}

/// Append a right-aligned user bubble.
pub fn append_user_row(chat: &ChatWidgets, text: &str, timestamp: &str) {
    let row = gtk4::Box::new(gtk4::Orientation::Vertical, 2);
    row.set_halign(gtk4::Align::End);

    let bubble = bubble_label(text);
    bubble.add_css_class("user-bubble");
    row.append(&bubble);
    row.append(&stamp_label(timestamp, gtk4::Align::End));

    chat.list.append(&row);
}

/// Append a left-aligned "Thinking…" placeholder and hand back its
/// handles so the answer (or an error) can land in it later.
pub fn append_pending_row(chat: &ChatWidgets, timestamp: &str) -> MessageRow {
    let root = gtk4::Box::new(gtk4::Orientation::Vertical, 2);
    root.set_halign(gtk4::Align::Start);

    let hbox = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
    hbox.add_css_class("chat-bubble");
    hbox.add_css_class("assistant-bubble");

    let spinner = gtk4::Spinner::new();
    spinner.start();

    let body = bubble_label("Thinking\u{2026}");
    body.remove_css_class("chat-bubble");
    body.add_css_class("dim-label");

    hbox.append(&spinner);
    hbox.append(&body);
    root.append(&hbox);
    root.append(&stamp_label(timestamp, gtk4::Align::Start));

    chat.list.append(&root);

    MessageRow { body, spinner }
}

/// The answer is in: stop the spinner and blank the body so the reveal
/// can type into it.
pub fn begin_answer(row: &MessageRow) {
    row.spinner.stop();
    row.spinner.set_visible(false);
    row.body.remove_css_class("dim-label");
    row.body.set_text("");
}

/// Replace the placeholder with a static error message.
pub fn mark_row_failed(row: &MessageRow, message: &str) {
    row.spinner.stop();
    row.spinner.set_visible(false);
    row.body.remove_css_class("dim-label");
    row.body.add_css_class("status-error");
    row.body.set_text(message);
}

/// Drop every message row.
pub fn clear(chat: &ChatWidgets) {
    while let Some(child) = chat.list.first_child() {
        chat.list.remove(&child);
    }
}

fn bubble_label(text: &str) -> gtk4::Label {
    let label = gtk4::Label::new(Some(text));
    label.set_wrap(true);
    label.set_wrap_mode(gtk4::pango::WrapMode::WordChar);
    label.set_xalign(0.0);
    label.set_selectable(true);
    label.set_max_width_chars(44);
    label.add_css_class("chat-bubble");
    label
}

fn stamp_label(timestamp: &str, align: gtk4::Align) -> gtk4::Label {
    let label = gtk4::Label::new(Some(timestamp));
    label.add_css_class("dim-label");
    label.add_css_class("caption");
    label.set_halign(align);
    label
}
