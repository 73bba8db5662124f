use std::path::PathBuf;

use clap::Parser;

/// Split a labeled YOLO export into train/val/test partitions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Folder that contains the images/, labels/ directories and classes file
    #[arg(long, value_name = "DIR")]
    pub source_root: PathBuf,

    /// Images folder name inside source-root
    #[arg(long, default_value = "images", value_name = "NAME")]
    pub images_dir: String,

    /// Labels folder name inside source-root
    #[arg(long, default_value = "labels", value_name = "NAME")]
    pub labels_dir: String,

    /// Classes file name inside source-root
    #[arg(long, default_value = "classes.txt", value_name = "NAME")]
    pub classes: String,

    /// Output dataset root (created if missing)
    #[arg(long, default_value = "datasets/ecosort", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Proportion of images for the test set (0.0 - 1.0)
    #[arg(long, default_value = "0.10", value_name = "FRACTION")]
    pub test_size: f64,

    /// Proportion of images for the validation set (0.0 - 1.0)
    #[arg(long, default_value = "0.10", value_name = "FRACTION")]
    pub val_size: f64,

    /// Random seed for the shuffle
    #[arg(long, default_value = "42", value_name = "SEED")]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let args = Args::parse_from(["ecosort-dataset", "--source-root", "/data/export"]);
        assert_eq!(args.images_dir, "images");
        assert_eq!(args.labels_dir, "labels");
        assert_eq!(args.classes, "classes.txt");
        assert_eq!(args.out_dir, PathBuf::from("datasets/ecosort"));
        assert_eq!(args.test_size, 0.10);
        assert_eq!(args.val_size, 0.10);
        assert_eq!(args.seed, 42);
    }

    #[test]
    fn source_root_is_required() {
        assert!(Args::try_parse_from(["ecosort-dataset"]).is_err());
    }
}
