fn main() {
    // icons/icon.ico is required for the Windows resource file
    tauri_build::build();
}
