use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::session::SelectedFile;

/// Kind of message shown in the status area.
pub enum Status {
    Loading,
    Success,
    Error,
}

/// Handles returned from building the main window.
pub struct WindowWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub upload_area: gtk4::Box,
    pub file_row: libadwaita::ActionRow,
    pub remove_button: gtk4::Button,
    pub transcribe_button: gtk4::Button,
    pub status_box: gtk4::Box,
    pub status_spinner: gtk4::Spinner,
    pub status_label: gtk4::Label,
    pub progress_bar: gtk4::ProgressBar,
    pub transcript_row: libadwaita::ExpanderRow,
    pub transcript_label: gtk4::Label,
}

/// Build the main window. `chat_root` is the chat panel, embedded below
/// the upload section.
pub fn build_window(
    app: &libadwaita::Application,
    server_url: &str,
    chat_root: &gtk4::Box,
) -> WindowWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Transcript Chat")
        .default_width(480)
        .default_height(700)
        .build();

    install_css();

    let toolbar_view = libadwaita::ToolbarView::new();
    toolbar_view.add_top_bar(&libadwaita::HeaderBar::new());

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    // --- Upload area ---
    let upload_area = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
    upload_area.add_css_class("upload-area");

    let icon = gtk4::Image::from_icon_name("folder-music-symbolic");
    icon.set_pixel_size(36);
    let drop_label = gtk4::Label::new(Some("Drop an audio or video file here"));
    drop_label.add_css_class("heading");
    let browse_label = gtk4::Label::new(Some("or click to browse"));
    browse_label.add_css_class("dim-label");

    upload_area.append(&icon);
    upload_area.append(&drop_label);
    upload_area.append(&browse_label);
    content.append(&upload_area);

    // --- File group ---
    let file_group = libadwaita::PreferencesGroup::new();
    file_group.set_margin_top(12);

    let file_row = libadwaita::ActionRow::builder().visible(false).build();
    let remove_button = gtk4::Button::from_icon_name("window-close-symbolic");
    remove_button.set_valign(gtk4::Align::Center);
    remove_button.add_css_class("flat");
    remove_button.set_tooltip_text(Some("Remove file"));
    file_row.add_suffix(&remove_button);
    file_group.add(&file_row);

    let transcript_row = libadwaita::ExpanderRow::builder()
        .title("Transcript")
        .visible(false)
        .build();
    let transcript_label = gtk4::Label::new(None);
    transcript_label.set_wrap(true);
    transcript_label.set_xalign(0.0);
    transcript_label.set_selectable(true);
    transcript_label.set_margin_top(4);
    transcript_label.set_margin_bottom(4);
    transcript_label.set_margin_start(8);
    transcript_label.set_margin_end(8);
    let transcript_child = libadwaita::ActionRow::new();
    transcript_child.set_child(Some(&transcript_label));
    transcript_row.add_row(&transcript_child);
    file_group.add(&transcript_row);

    let server_row = libadwaita::ActionRow::builder().title("Server").build();
    let server_label = gtk4::Label::new(Some(server_url));
    server_label.add_css_class("dim-label");
    server_row.add_suffix(&server_label);
    file_group.add(&server_row);

    content.append(&file_group);

    // --- Transcribe button + status ---
    let transcribe_button = gtk4::Button::with_label("Transcribe");
    transcribe_button.add_css_class("suggested-action");
    transcribe_button.set_sensitive(false);
    transcribe_button.set_margin_top(8);
    content.append(&transcribe_button);

    let status_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    status_box.set_margin_top(8);
    status_box.set_visible(false);
    let status_spinner = gtk4::Spinner::new();
    let status_label = gtk4::Label::new(None);
    status_label.set_wrap(true);
    status_label.set_xalign(0.0);
    status_box.append(&status_spinner);
    status_box.append(&status_label);
    content.append(&status_box);

    let progress_bar = gtk4::ProgressBar::new();
    progress_bar.set_margin_top(8);
    progress_bar.set_visible(false);
    progress_bar.set_show_text(true);
    content.append(&progress_bar);

    // --- Chat ---
    content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));
    let chat_heading = gtk4::Label::new(Some("Chat"));
    chat_heading.add_css_class("heading");
    chat_heading.set_xalign(0.0);
    chat_heading.set_margin_top(12);
    content.append(&chat_heading);
    content.append(chat_root);

    toolbar_view.set_content(Some(&content));
    window.set_content(Some(&toolbar_view));

    WindowWidgets {
        window,
        upload_area,
        file_row,
        remove_button,
        transcribe_button,
        status_box,
        status_spinner,
        status_label,
        progress_bar,
        transcript_row,
        transcript_label,
    }
}

/// Show or hide the file row to match the current selection.
pub fn sync_file_row(widgets: &WindowWidgets, file: Option<&SelectedFile>) {
    match file {
        Some(file) => {
            widgets.file_row.set_title(&file.name);
            widgets.file_row.set_subtitle(&format_size(file.size));
            widgets.file_row.set_visible(true);
        }
        None => widgets.file_row.set_visible(false),
    }
}

/// Show a status message. Loading gets a spinner, success and error get
/// a colored label.
pub fn show_status(widgets: &WindowWidgets, status: Status, message: &str) {
    widgets.status_label.set_text(message);
    widgets.status_label.remove_css_class("status-success");
    widgets.status_label.remove_css_class("status-error");
    match status {
        Status::Loading => {
            widgets.status_spinner.set_visible(true);
            widgets.status_spinner.start();
        }
        Status::Success => {
            widgets.status_spinner.stop();
            widgets.status_spinner.set_visible(false);
            widgets.status_label.add_css_class("status-success");
        }
        Status::Error => {
            widgets.status_spinner.stop();
            widgets.status_spinner.set_visible(false);
            widgets.status_label.add_css_class("status-error");
        }
    }
    widgets.status_box.set_visible(true);
}

pub fn hide_status(widgets: &WindowWidgets) {
    widgets.status_spinner.stop();
    widgets.status_box.set_visible(false);
}

/// Fill or hide the collapsible transcript preview row.
pub fn set_transcript(widgets: &WindowWidgets, transcript: Option<&str>) {
    match transcript {
        Some(text) => {
            let mut preview: String = text.chars().take(100).collect();
            if text.chars().count() > 100 {
                preview.push_str("...");
            }
            widgets.transcript_row.set_subtitle(&preview);
            widgets.transcript_label.set_text(text);
            widgets.transcript_row.set_visible(true);
        }
        None => {
            widgets.transcript_row.set_expanded(false);
            widgets.transcript_row.set_subtitle("");
            widgets.transcript_label.set_text("");
            widgets.transcript_row.set_visible(false);
        }
    }
}

fn format_size(bytes: u64) -> String {
    let mb = bytes as f64 / 1_048_576.0;
    if mb >= 1.0 {
        format!("{mb:.1} MB")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

fn install_css() {
    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(
        r#"
        .upload-area {
            border: 2px dashed alpha(currentColor, 0.3);
            border-radius: 12px;
            padding: 20px;
        }
        .upload-area.dragover {
            border-color: @accent_color;
            background-color: alpha(@accent_bg_color, 0.1);
        }
        .chat-bubble {
            border-radius: 12px;
            padding: 8px 12px;
        }
        .user-bubble {
            background-color: @accent_bg_color;
            color: @accent_fg_color;
        }
        .assistant-bubble {
            background-color: alpha(currentColor, 0.08);
        }
        .status-success {
            color: @success_color;
        }
        .status-error {
            color: @error_color;
        }
        "#,
    );
    gtk4::style_context_add_provider_for_display(
        &gtk4::gdk::Display::default().unwrap(),
        &css_provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
