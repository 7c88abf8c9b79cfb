mod app;
mod assistant;
mod config;
mod reveal;
mod session;
mod transcriber;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use app::{AppState, BackendEvent};

fn main() {
    env_logger::init();
    log::info!("Transcript Chat starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.tr4m0ryp.transcript-chat")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(application: &libadwaita::Application) {
    // Async channel for backend → UI communication
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let state = Rc::new(RefCell::new(AppState::new(backend_tx)));

    // Build UI
    let chat = ui::chat::build_chat_panel();
    let window = ui::window::build_window(
        application,
        &state.borrow().config.api_base_url,
        &chat.root,
    );

    // Click-to-browse on the upload area
    {
        let state_clone = state.clone();
        let parent = window.window.clone();
        let click = gtk4::GestureClick::new();
        click.connect_released(move |_, _, _, _| {
            let dialog = gtk4::FileDialog::builder()
                .title("Choose a media file")
                .build();
            let state_inner = state_clone.clone();
            dialog.open(Some(&parent), gtk4::gio::Cancellable::NONE, move |result| {
                if let Ok(file) = result {
                    if let Some(path) = file.path() {
                        app::select_file(&state_inner, path);
                    }
                }
            });
        });
        window.upload_area.add_controller(click);
    }

    // Drag-and-drop onto the upload area
    {
        let state_clone = state.clone();
        let area = window.upload_area.clone();
        let drop_target = gtk4::DropTarget::new(
            gtk4::gio::File::static_type(),
            gtk4::gdk::DragAction::COPY,
        );
        let area_enter = area.clone();
        drop_target.connect_enter(move |_, _, _| {
            area_enter.add_css_class("dragover");
            gtk4::gdk::DragAction::COPY
        });
        let area_leave = area.clone();
        drop_target.connect_leave(move |_| {
            area_leave.remove_css_class("dragover");
        });
        let area_drop = area.clone();
        drop_target.connect_drop(move |_, value, _, _| {
            area_drop.remove_css_class("dragover");
            if let Ok(file) = value.get::<gtk4::gio::File>() {
                if let Some(path) = file.path() {
                    app::select_file(&state_clone, path);
                    return true;
                }
            }
            false
        });
        area.add_controller(drop_target);
    }

    // Remove file
    {
        let state_clone = state.clone();
        window.remove_button.connect_clicked(move |_| {
            app::remove_file(&state_clone);
        });
    }

    // Transcribe
    {
        let state_clone = state.clone();
        window.transcribe_button.connect_clicked(move |_| {
            app::start_transcription(&state_clone);
        });
    }

    // Send on button click or Enter in the input
    {
        let state_clone = state.clone();
        chat.send_button.connect_clicked(move |_| {
            app::send_message(&state_clone);
        });
    }
    {
        let state_clone = state.clone();
        chat.input.connect_activate(move |_| {
            app::send_message(&state_clone);
        });
    }

    // Store UI handles in state and show the window
    {
        let mut s = state.borrow_mut();
        s.window = Some(window);
        s.chat = Some(chat);
    }
    if let Some(ref win) = state.borrow().window {
        win.window.present();
    }

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }
}
