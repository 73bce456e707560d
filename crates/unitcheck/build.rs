// Build script for check_systemd - embeds version at compile time

fn main() {
    // Packagers may override the version, otherwise Cargo.toml wins
    let version = std::env::var("UNITCHECK_VERSION")
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=UNITCHECK_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=UNITCHECK_VERSION");
}
