pub const LANDING: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const VERIFY: &str = "/verify";
pub const DASHBOARD: &str = "/dashboard";
pub const PROFILE: &str = "/profile";
pub const DOCTORS: &str = "/doctors";
pub const LABORATORIES: &str = "/laboratories";
pub const MEDICINES: &str = "/medicines";
pub const ORDERS: &str = "/orders";
pub const APPOINTMENTS: &str = "/appointments";
pub const CART: &str = "/cart";
