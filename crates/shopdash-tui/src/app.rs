//! Application state management for shopdash.
//!
//! This module contains the `App` struct that owns all UI state: the current
//! route, loaded backend data, the login form, and the channel background
//! fetches report back on. Session state itself lives in the core's
//! `SessionContext`; the app only reads it through the route guard.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use shopdash_core::api::ApiClient;
use shopdash_core::config::ENV_PASSWORD;
use shopdash_core::models::{
    DashboardSummary, Order, OrderAnalytics, OrderQuery, Page, Product, ProductPerformance,
    RevenueAnalytics, StoreInfo, UserProfile,
};
use shopdash_core::{
    ApiError, ChannelNavigator, Config, GuardOutcome, LoginError, Navigation, NavigationMode, Route,
    RouteGuard, SessionContext,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh sends 9 results, so 32 leaves room for overlapping reloads.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Maximum number of entries kept in the back history
const MAX_HISTORY: usize = 32;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for the stored session check
    Starting,
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background fetch tasks back to the main loop.
enum DataResult {
    Summary(DashboardSummary),
    Orders(Page<Order>),
    OrderUpdated(Order),
    Products(Vec<Product>),
    ProductAnalytics(Vec<ProductPerformance>),
    OrderAnalytics(OrderAnalytics),
    RevenueAnalytics(RevenueAnalytics),
    Profile(UserProfile),
    StoreInfo(Option<StoreInfo>),
    /// Signal that a batch of fetches has completed
    RefreshComplete,
    /// A fetch failed; carries a message for the status bar
    Error(String),
}

/// Everything loaded from the backend. Dropped wholesale on logout.
#[derive(Debug, Default)]
pub struct Data {
    pub summary: Option<DashboardSummary>,
    pub orders: Option<Page<Order>>,
    pub products: Vec<Product>,
    pub product_performance: Vec<ProductPerformance>,
    pub order_analytics: Option<OrderAnalytics>,
    pub revenue_analytics: Option<RevenueAnalytics>,
    pub profile: Option<UserProfile>,
    pub store_info: Option<StoreInfo>,
}

impl Data {
    /// Currency code from the store settings, if configured
    pub fn currency(&self) -> Option<&str> {
        self.store_info.as_ref().and_then(|s| s.currency.as_deref())
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionContext>,
    pub api: ApiClient,
    guard: RouteGuard,
    nav_rx: mpsc::UnboundedReceiver<Navigation>,

    // Navigation
    pub route: Route,
    history: Vec<Route>,

    // UI State
    pub state: AppState,
    pub search_query: String,
    pub order_query: OrderQuery,
    pub order_selection: usize,
    pub product_selection: usize,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    logout_requested: bool,

    // Loaded data
    pub data: Data,
    pub loading: bool,

    // Background task channel
    data_rx: mpsc::Receiver<DataResult>,
    data_tx: mpsc::Sender<DataResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance from a loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(config.build_store().context("Failed to open token storage")?);
        debug!(backend = store.backend_name(), "Credential store ready");

        let (navigator, nav_rx) = ChannelNavigator::new();
        let navigator = Arc::new(navigator);

        let api = ApiClient::new(
            &config.api_base_url,
            config.request_timeout(),
            store.clone(),
            navigator.clone(),
        )
        .context("Failed to create API client")?;
        let session = Arc::new(SessionContext::new(store, api.auth().clone(), navigator));

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = config.last_username.clone().unwrap_or_default();
        let login_password = std::env::var(ENV_PASSWORD).unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,
            guard: RouteGuard::default(),
            nav_rx,

            route: Route::LANDING,
            history: Vec::new(),

            state: AppState::Starting,
            search_query: String::new(),
            order_query: OrderQuery::default(),
            order_selection: 0,
            product_selection: 0,

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,
            logout_requested: false,

            data: Data::default(),
            loading: false,

            data_rx: rx,
            data_tx: tx,

            status_message: None,
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Run the stored session check, then route accordingly
    pub fn restore(&mut self) {
        let state = self.session.restore();
        info!(authenticated = state.authenticated, "Session restored");
        self.apply_guard();
        if state.authenticated {
            self.refresh_all_background();
        }
    }

    /// Re-evaluate the current route against the session
    pub fn apply_guard(&mut self) {
        match self.guard.evaluate(self.session.state(), self.route) {
            GuardOutcome::Placeholder => self.state = AppState::Starting,
            GuardOutcome::Render(Route::Login) => self.start_login(),
            GuardOutcome::Render(_) => {
                if matches!(self.state, AppState::Starting | AppState::LoggingIn) {
                    self.state = AppState::Normal;
                }
            }
            GuardOutcome::Redirect { to, replace } => {
                debug!(from = %self.route, to = %to, "Guard redirect");
                let nav = if replace {
                    Navigation::replace(to)
                } else {
                    Navigation::push(to)
                };
                self.navigate(nav);
            }
        }
    }

    /// Apply a navigation request, honoring push/replace history semantics
    pub fn navigate(&mut self, nav: Navigation) {
        if nav.route == self.route && nav.mode == NavigationMode::Push {
            return;
        }
        match nav.mode {
            NavigationMode::Push => {
                self.history.push(self.route);
                if self.history.len() > MAX_HISTORY {
                    self.history.remove(0);
                }
            }
            NavigationMode::Replace => {}
        }
        self.route = nav.route;

        if nav.route == Route::Login {
            self.on_signed_out();
        }
        self.apply_guard();
    }

    /// Go back to the previous protected view, if any
    pub fn back(&mut self) {
        while let Some(route) = self.history.pop() {
            if route.is_protected() {
                self.route = route;
                self.apply_guard();
                return;
            }
        }
    }

    /// Select a tab directly
    pub fn open(&mut self, route: Route) {
        self.navigate(Navigation::push(route));
    }

    /// Drain navigation requests sent by the core
    pub fn check_navigation(&mut self) {
        while let Ok(nav) = self.nav_rx.try_recv() {
            debug!(route = %nav.route, mode = ?nav.mode, "Applying navigation");
            self.navigate(nav);
        }
    }

    fn on_signed_out(&mut self) {
        if std::mem::take(&mut self.logout_requested) {
            self.login_error = None;
        } else if self.state != AppState::LoggingIn && self.state != AppState::Starting {
            // Not user initiated: the pipeline gave up on the session
            warn!("Session ended by the request pipeline");
            self.login_error = Some(ApiError::SessionExpired.user_message());
        }
        self.data = Data::default();
        self.history.clear();
        self.loading = false;
        self.order_selection = 0;
        self.product_selection = 0;
        self.status_message = None;
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<(), LoginError> {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        match self.session.try_login(&username, &password).await {
            Ok(()) => {
                self.login_password.clear();
                self.login_error = None;
                self.state = AppState::Normal;

                if let Err(e) = Config::remember_username(&username) {
                    warn!(error = %e, "Failed to save config");
                }
                self.config.last_username = Some(username);

                // The landing navigation is queued by the session
                self.check_navigation();
                self.refresh_all_background();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(Self::login_message(&e));
                Err(e)
            }
        }
    }

    fn login_message(e: &LoginError) -> String {
        match e {
            LoginError::Api(api) => api.user_message(),
            other => other.to_string(),
        }
    }

    /// Clear the session and return to the login overlay
    pub fn logout(&mut self) {
        self.logout_requested = true;
        if let Err(e) = self.session.logout() {
            self.status_message = Some(format!("Logout incomplete: {}", e));
        }
        self.check_navigation();
    }

    // =========================================================================
    // Background Fetches
    // =========================================================================

    /// Helper to send results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<DataResult>, result: DataResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send data result - channel closed");
        }
    }

    /// Turn a fetch outcome into a result message. Session loss is not
    /// reported here: the forced-logout navigation already covers it.
    async fn send_fetch<T>(
        tx: &mpsc::Sender<DataResult>,
        what: &str,
        result: Result<T, ApiError>,
        wrap: impl FnOnce(T) -> DataResult,
    ) {
        match result {
            Ok(value) => Self::send_result(tx, wrap(value)).await,
            Err(e) if e.is_session_loss() => debug!(what = what, "Fetch ended by session loss"),
            Err(e) => {
                warn!(what = what, error = %e, "Fetch failed");
                Self::send_result(tx, DataResult::Error(format!("{}: {}", what, e.user_message())))
                    .await;
            }
        }
    }

    /// Spawn a background task that reloads every view
    pub fn refresh_all_background(&mut self) {
        info!("Starting background refresh of all data");
        let api = self.api.clone();
        let tx = self.data_tx.clone();
        let query = self.order_query.clone();

        tokio::spawn(async move {
            let (summary, orders, products, perf, order_stats, revenue, profile, store) = tokio::join!(
                api.dashboard_summary(),
                api.orders(&query),
                api.products(),
                api.product_analytics(),
                api.order_analytics(),
                api.revenue_analytics(),
                api.profile(),
                api.store_info(),
            );

            Self::send_fetch(&tx, "Dashboard", summary, DataResult::Summary).await;
            Self::send_fetch(&tx, "Orders", orders, DataResult::Orders).await;
            Self::send_fetch(&tx, "Products", products, DataResult::Products).await;
            Self::send_fetch(&tx, "Product analytics", perf, DataResult::ProductAnalytics).await;
            Self::send_fetch(&tx, "Order analytics", order_stats, DataResult::OrderAnalytics).await;
            Self::send_fetch(&tx, "Revenue", revenue, DataResult::RevenueAnalytics).await;
            Self::send_fetch(&tx, "Profile", profile, DataResult::Profile).await;
            Self::send_fetch(&tx, "Store", store, DataResult::StoreInfo).await;
            Self::send_result(&tx, DataResult::RefreshComplete).await;
        });

        self.loading = true;
        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Reload only the data shown on the current view
    pub fn refresh_current_view(&mut self) {
        let api = self.api.clone();
        let tx = self.data_tx.clone();
        let route = self.route;
        let query = self.order_query.clone();

        tokio::spawn(async move {
            match route {
                Route::Dashboard => {
                    Self::send_fetch(&tx, "Dashboard", api.dashboard_summary().await, DataResult::Summary)
                        .await;
                }
                Route::Orders => {
                    Self::send_fetch(&tx, "Orders", api.orders(&query).await, DataResult::Orders).await;
                }
                Route::Products => {
                    Self::send_fetch(&tx, "Products", api.products().await, DataResult::Products).await;
                }
                Route::Analytics => {
                    let (perf, orders, revenue) = tokio::join!(
                        api.product_analytics(),
                        api.order_analytics(),
                        api.revenue_analytics(),
                    );
                    Self::send_fetch(&tx, "Product analytics", perf, DataResult::ProductAnalytics).await;
                    Self::send_fetch(&tx, "Order analytics", orders, DataResult::OrderAnalytics).await;
                    Self::send_fetch(&tx, "Revenue", revenue, DataResult::RevenueAnalytics).await;
                }
                Route::Profile => {
                    Self::send_fetch(&tx, "Profile", api.profile().await, DataResult::Profile).await;
                }
                Route::StoreInfo => {
                    Self::send_fetch(&tx, "Store", api.store_info().await, DataResult::StoreInfo).await;
                }
                Route::Login | Route::NotFound => {}
            }
            Self::send_result(&tx, DataResult::RefreshComplete).await;
        });

        self.loading = true;
        self.status_message = Some(format!("Refreshing {}...", self.route.title()));
    }

    /// Apply the search box to the order list and reload page 1
    pub fn search_orders(&mut self) {
        let term = self.search_query.trim();
        self.order_query = if term.is_empty() {
            OrderQuery::default()
        } else {
            OrderQuery::search(term)
        };
        self.order_selection = 0;
        self.refresh_current_view();
    }

    /// Move the order list one page forward or back
    pub fn change_order_page(&mut self, forward: bool) {
        let Some(page) = self.data.orders.as_ref() else {
            return;
        };
        let current = self.order_query.page.unwrap_or(1);
        let target = if forward {
            if !page.has_next() {
                return;
            }
            current + 1
        } else {
            if page.previous.is_none() || current <= 1 {
                return;
            }
            current - 1
        };
        self.order_query = self.order_query.clone().page(target);
        self.order_selection = 0;
        self.refresh_current_view();
    }

    /// Move the selected order one step through the fulfilment flow
    pub fn advance_selected_order(&mut self) {
        let Some((order_number, current)) = self
            .selected_order()
            .map(|o| (o.order_number.clone(), o.status()))
        else {
            return;
        };
        let next = current.advance();
        if next == current {
            self.status_message = Some(format!("Order {} is already {}", order_number, current));
            return;
        }

        let api = self.api.clone();
        let tx = self.data_tx.clone();
        let number = order_number.clone();
        tokio::spawn(async move {
            let result = api.update_order_status(&number, next).await;
            Self::send_fetch(&tx, "Order update", result, DataResult::OrderUpdated).await;
        });
        self.status_message = Some(format!("Marking {} as {}...", order_number, next));
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.data_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_data_result(result);
        }
    }

    fn process_data_result(&mut self, result: DataResult) {
        // Late results from before a logout are dropped
        if !self.session.is_authenticated() {
            return;
        }
        match result {
            DataResult::Summary(summary) => self.data.summary = Some(summary),
            DataResult::Orders(page) => {
                self.order_selection = self
                    .order_selection
                    .min(page.results.len().saturating_sub(1));
                self.data.orders = Some(page);
            }
            DataResult::OrderUpdated(order) => {
                self.status_message = Some(format!(
                    "Order {} is now {}",
                    order.order_number,
                    order.status()
                ));
                if let Some(page) = self.data.orders.as_mut() {
                    if let Some(slot) = page
                        .results
                        .iter_mut()
                        .find(|o| o.order_number == order.order_number)
                    {
                        *slot = order;
                    }
                }
            }
            DataResult::Products(products) => {
                self.product_selection = self
                    .product_selection
                    .min(products.len().saturating_sub(1));
                self.data.products = products;
            }
            DataResult::ProductAnalytics(perf) => self.data.product_performance = perf,
            DataResult::OrderAnalytics(stats) => self.data.order_analytics = Some(stats),
            DataResult::RevenueAnalytics(revenue) => self.data.revenue_analytics = Some(revenue),
            DataResult::Profile(profile) => self.data.profile = Some(profile),
            DataResult::StoreInfo(info) => self.data.store_info = info,
            DataResult::RefreshComplete => {
                self.loading = false;
                if self
                    .status_message
                    .as_deref()
                    .map(|m| m.starts_with("Refreshing"))
                    .unwrap_or(false)
                {
                    self.status_message = None;
                }
            }
            DataResult::Error(message) => self.status_message = Some(message),
        }
    }

    // =========================================================================
    // Selection helpers
    // =========================================================================

    pub fn orders(&self) -> &[Order] {
        self.data
            .orders
            .as_ref()
            .map(|p| p.results.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_order(&self) -> Option<&Order> {
        self.orders().get(self.order_selection)
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.data.products.get(self.product_selection)
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shopdash_core::TokenStorage;

    fn app() -> App {
        let config = Config {
            api_base_url: "http://127.0.0.1:9/api/".to_string(),
            token_storage: TokenStorage::Memory,
            ..Default::default()
        };
        App::new(config).unwrap()
    }

    fn signed_in_app() -> App {
        let mut app = app();
        app.session.store().set_pair("a1", "r1").unwrap();
        app.session.restore();
        app.apply_guard();
        app
    }

    #[test]
    fn test_starts_on_placeholder_until_restore() {
        let mut app = app();
        app.apply_guard();
        assert_eq!(app.state, AppState::Starting);
        assert_eq!(app.route, Route::Dashboard);
    }

    #[test]
    fn test_signed_out_restore_redirects_to_login() {
        let mut app = app();
        app.session.restore();
        app.apply_guard();
        assert_eq!(app.route, Route::Login);
        assert_eq!(app.state, AppState::LoggingIn);
        // Redirects replace history, so there is nothing to go back to
        assert!(app.history.is_empty());
        assert!(app.login_error.is_none());
    }

    #[test]
    fn test_signed_in_restore_renders_landing() {
        let app = signed_in_app();
        assert_eq!(app.route, Route::Dashboard);
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_push_and_back() {
        let mut app = signed_in_app();
        app.open(Route::Orders);
        app.open(Route::Profile);
        assert_eq!(app.route, Route::Profile);

        app.back();
        assert_eq!(app.route, Route::Orders);
        app.back();
        assert_eq!(app.route, Route::Dashboard);
        app.back();
        assert_eq!(app.route, Route::Dashboard);
    }

    #[test]
    fn test_forced_logout_shows_session_expired() {
        let mut app = signed_in_app();
        app.data.products = vec![];
        app.data.summary = Some(DashboardSummary::default());

        // What the pipeline does when a refresh fails
        app.session.store().clear().unwrap();
        app.navigate(Navigation::replace(Route::Login));

        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(
            app.login_error.as_deref(),
            Some("Session expired - please log in again")
        );
        assert!(app.data.summary.is_none());
    }

    #[test]
    fn test_user_logout_has_no_error() {
        let mut app = signed_in_app();
        app.open(Route::Orders);
        app.logout();

        assert_eq!(app.route, Route::Login);
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.login_error.is_none());
        assert!(!app.session.is_authenticated());
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_results_after_logout_are_dropped() {
        let mut app = signed_in_app();
        app.logout();
        app.process_data_result(DataResult::Summary(DashboardSummary::default()));
        assert!(app.data.summary.is_none());
    }

    #[test]
    fn test_refresh_complete_clears_refresh_message() {
        let mut app = signed_in_app();
        app.loading = true;
        app.status_message = Some("Refreshing data...".to_string());
        app.process_data_result(DataResult::RefreshComplete);
        assert!(!app.loading);
        assert!(app.status_message.is_none());

        app.process_data_result(DataResult::Error("Orders: boom".to_string()));
        app.process_data_result(DataResult::RefreshComplete);
        assert_eq!(app.status_message.as_deref(), Some("Orders: boom"));
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }
}
