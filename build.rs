fn main() {
    let target_arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap();
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap();

    if target_os != "linux" && target_os != "macos" {
        panic!("unsupported OS: {}", target_os);
    }

    let asm_file = match target_arch.as_str() {
        "x86_64" => "asm/context_x86_64.S",
        "aarch64" => "asm/context_aarch64.S",
        _ => panic!("unsupported architecture: {}", target_arch),
    };

    if !std::path::Path::new(asm_file).exists() {
        panic!("assembly file {} not found", asm_file);
    }

    let mut build = cc::Build::new();
    build.file(asm_file).flag("-fPIC");

    if target_arch == "x86_64" {
        build.flag("-ggdb");
    }

    build.compile("ctxswitch");

    println!("cargo:rerun-if-changed={}", asm_file);
    println!("cargo:rerun-if-changed=build.rs");
}
