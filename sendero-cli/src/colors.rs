use colored::CustomColor;

/// Catppuccin Mocha accents used by the route table and banners.
pub fn mauve() -> CustomColor {
    CustomColor::new(203, 166, 247)
}

pub fn sky() -> CustomColor {
    CustomColor::new(137, 220, 235)
}

pub fn subtext() -> CustomColor {
    CustomColor::new(166, 173, 200)
}

pub fn green() -> CustomColor {
    CustomColor::new(166, 227, 161)
}

pub fn yellow() -> CustomColor {
    CustomColor::new(249, 226, 175)
}

pub fn red() -> CustomColor {
    CustomColor::new(243, 139, 168)
}

/// Color for an HTTP method in listings.
pub fn method(method: &str) -> CustomColor {
    match method {
        "GET" => green(),
        "POST" => sky(),
        "PUT" => yellow(),
        "DELETE" => red(),
        _ => subtext(),
    }
}
