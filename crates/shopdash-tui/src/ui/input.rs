//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use shopdash_core::Route;

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, LoginFocus, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::Starting => {
            // Nothing to interact with until the session check resolves
            return Ok(matches!(key.code, KeyCode::Char('q') | KeyCode::Esc));
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => return handle_search_input(app, key),
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='6') => {
            let index = (c as usize) - ('1' as usize);
            app.open(Route::PROTECTED[index]);
            return Ok(false);
        }
        KeyCode::Left => {
            app.open(app.route.prev());
            return Ok(false);
        }
        KeyCode::Right => {
            app.open(app.route.next());
            return Ok(false);
        }
        KeyCode::Esc | KeyCode::Backspace => {
            app.back();
            return Ok(false);
        }
        KeyCode::Char('u') => {
            if app.loading {
                app.status_message = Some("Refresh already in progress...".to_string());
            } else {
                app.refresh_current_view();
            }
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout();
            return Ok(false);
        }
        _ => {}
    }

    match app.route {
        Route::Orders => handle_orders_input(app, key),
        Route::Products => handle_products_input(app, key),
        _ => {}
    }
    Ok(false)
}

/// Move a list selection, clamped to `len`
fn move_selection(selection: &mut usize, len: usize, key: KeyCode) {
    let max_index = len.saturating_sub(1);
    *selection = match key {
        KeyCode::Up | KeyCode::Char('k') => selection.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => (*selection + 1).min(max_index),
        KeyCode::PageUp => selection.saturating_sub(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => (*selection + PAGE_SCROLL_SIZE).min(max_index),
        KeyCode::Home => 0,
        KeyCode::End => max_index,
        _ => *selection,
    };
}

fn handle_orders_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('s') => app.advance_selected_order(),
        KeyCode::Char('n') => app.change_order_page(true),
        KeyCode::Char('p') => app.change_order_page(false),
        code => {
            let len = app.orders().len();
            move_selection(&mut app.order_selection, len, code);
        }
    }
}

fn handle_products_input(app: &mut App, key: KeyEvent) {
    let len = app.data.products.len();
    move_selection(&mut app.product_selection, len, key.code);
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
            // Drop an active filter as well
            if app.order_query.search.is_some() {
                app.search_orders();
            }
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            app.search_orders();
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            if !c.is_control() {
                app.search_query.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            // Enter on the password field submits, like a browser form
            LoginFocus::Password | LoginFocus::Button => {
                // Failure is shown through login_error
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
