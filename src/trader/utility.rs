//! General utility functions.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::constant::STRIKE_STEP;

/// Get simulator directory
fn get_sim_dir(temp_name: &str) -> (PathBuf, PathBuf) {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let temp_path = cwd.join(temp_name);

    // If .optsim folder exists in current working directory, use it
    if temp_path.exists() {
        return (cwd, temp_path);
    }

    // Otherwise use home path
    let home_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let temp_path = home_path.join(temp_name);

    if !temp_path.exists() {
        let _ = fs::create_dir_all(&temp_path);
    }

    (home_path, temp_path)
}

/// Temp directory
pub static TEMP_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    let (_, temp_dir) = get_sim_dir(".optsim");
    temp_dir
});

/// Get path for temp file with filename
pub fn get_file_path(filename: &str) -> PathBuf {
    TEMP_DIR.join(filename)
}

/// Get path for temp folder with folder name
pub fn get_folder_path(folder_name: &str) -> PathBuf {
    let folder_path = TEMP_DIR.join(folder_name);
    if !folder_path.exists() {
        let _ = fs::create_dir_all(&folder_path);
    }
    folder_path
}

/// Round value to the nearest multiple of target
pub fn round_to(value: f64, target: f64) -> f64 {
    (value / target).round() * target
}

/// Strike on the grid nearest to `price`, shifted by `offset_steps` grid steps.
pub fn strike_from(price: f64, offset_steps: i32) -> f64 {
    round_to(price, STRIKE_STEP) + f64::from(offset_steps) * STRIKE_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(50049.0, 100.0), 50000.0);
        assert_eq!(round_to(50050.0, 100.0), 50100.0);
        assert_eq!(round_to(1.26, 0.5), 1.5);
    }

    #[test]
    fn test_strike_from() {
        assert_eq!(strike_from(50049.0, 0), 50000.0);
        assert_eq!(strike_from(50049.0, -1), 49900.0);
        assert_eq!(strike_from(50049.0, 1), 50100.0);
    }
}
