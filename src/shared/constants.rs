/// Municipal areas a report can be filed under
pub const AREAS: &[&str] = &[
    "Detroit",
    "Grand Rapids",
    "Warren",
    "Sterling Heights",
    "Lansing",
    "Ann Arbor",
    "Flint",
    "Kalamazoo",
    "Traverse City",
    "Saginaw",
    "Muskegon",
    "Dearborn",
    "Pontiac",
    "Royal Oak",
    "Battle Creek",
    "Midland",
    "Holland",
    "Bay City",
];

/// Image extensions accepted for upload (compared lowercase)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
