use std::fmt;

/// Views of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Analytics,
    Orders,
    Products,
    Profile,
    StoreInfo,
    NotFound,
}

impl Route {
    /// Protected views in tab order
    pub const PROTECTED: [Route; 6] = [
        Route::Dashboard,
        Route::Orders,
        Route::Products,
        Route::Analytics,
        Route::Profile,
        Route::StoreInfo,
    ];

    /// Landing view after a successful login
    pub const LANDING: Route = Route::Dashboard;

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Analytics => "/analytics",
            Route::Orders => "/orders",
            Route::Products => "/products",
            Route::Profile => "/profile",
            Route::StoreInfo => "/store-info",
            Route::NotFound => "/404",
        }
    }

    /// Parse a path; unknown paths map to `NotFound`
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Dashboard,
            "/login" => Route::Login,
            "/analytics" => Route::Analytics,
            "/orders" => Route::Orders,
            "/products" => Route::Products,
            "/profile" => Route::Profile,
            "/store-info" => Route::StoreInfo,
            _ => Route::NotFound,
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::NotFound)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Analytics => "Analytics",
            Route::Orders => "Orders",
            Route::Products => "Products",
            Route::Profile => "Profile",
            Route::StoreInfo => "Store",
            Route::NotFound => "Not Found",
        }
    }

    /// Next protected view (wrapping around)
    pub fn next(&self) -> Self {
        Self::step(*self, 1)
    }

    /// Previous protected view (wrapping around)
    pub fn prev(&self) -> Self {
        Self::step(*self, Self::PROTECTED.len() - 1)
    }

    fn step(from: Route, by: usize) -> Self {
        match Self::PROTECTED.iter().position(|r| *r == from) {
            Some(i) => Self::PROTECTED[(i + by) % Self::PROTECTED.len()],
            None => Self::LANDING,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
