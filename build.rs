//! Reports which OpenCV pkg-config module the `opencv` crate will link
//! against, with install hints when neither is present.

use std::process::Command;

const MODULES: [&str; 2] = ["opencv4", "opencv"];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    match MODULES.iter().find_map(|module| module_version(module).map(|v| (module, v))) {
        Some((module, version)) => println!("cargo:warning=Using {module} {version}"),
        None => {
            println!("cargo:warning=No OpenCV found via pkg-config; the sketch needs highgui, imgcodecs, imgproc and videoio");
            println!("cargo:warning=Debian/Ubuntu: apt-get install libopencv-dev pkg-config");
            println!("cargo:warning=macOS: brew install opencv pkg-config");
        }
    }
}

fn module_version(module: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", module]).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}
