/// Maps common catalog platform spellings to the names IGDB reports in
/// `platforms.name`. Unmapped input passes through trimmed, so a catalog that
/// already uses IGDB's naming needs no entry here.
pub fn canonical_platform(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed {
        "NES" => "Nintendo Entertainment System",
        "SNES" | "Super Nintendo" => "Super Nintendo Entertainment System",
        "N64" => "Nintendo 64",
        "GameCube" => "Nintendo GameCube",
        "Switch" => "Nintendo Switch",
        "3DS" => "Nintendo 3DS",
        "GBA" => "Game Boy Advance",
        "Mega Drive" | "Genesis" | "Sega Genesis" => "Sega Mega Drive/Genesis",
        "PS1" | "PlayStation 1" => "PlayStation",
        "PS2" => "PlayStation 2",
        "PS3" => "PlayStation 3",
        "PS4" => "PlayStation 4",
        "PS5" => "PlayStation 5",
        "PS Vita" => "PlayStation Vita",
        "PC" | "Windows" => "PC (Microsoft Windows)",
        "TurboGrafx-16" | "PC Engine" => "TurboGrafx-16/PC Engine",
        other => other,
    }
}
