//! Sample channel lineup

use tivo_protocol::Channel;

/// A small cable lineup with SD/HD duplicates and refiner-style names
pub fn demo_lineup() -> Vec<Channel> {
    vec![
        Channel::new("WABC", "7", "ABC", false, "tivo:ch.7"),
        Channel::new("WABCDT", "507", "ABC", true, "tivo:ch.507"),
        Channel::new("WCBS", "2", "CBS", false, "tivo:ch.2"),
        Channel::new("WCBSDT", "502", "CBS", true, "tivo:ch.502"),
        Channel::new("CNN", "202", "CNN", false, "tivo:ch.202"),
        Channel::new("CNNHD", "600", "CNN", true, "tivo:ch.600"),
        Channel::new("ESPN", "206", "ESPN", false, "tivo:ch.206"),
        Channel::new("ESPNHD", "570", "ESPN", true, "tivo:ch.570"),
        Channel::new("ESPNEWS", "207", "ESPN News", true, "tivo:ch.207"),
        Channel::new("FOXSPORTS1", "219", "Fox Sports", true, "tivo:ch.219"),
        Channel::new("FOXNEWS", "360", "Fox News", true, "tivo:ch.360"),
        Channel::new("FOXBUSINESS", "359", "Fox Business", true, "tivo:ch.359"),
        Channel::new("HBOHD", "800", "HBO", true, "tivo:ch.800"),
    ]
}
