use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::args::Args;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// The `data.yaml` manifest YOLO training consumes.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub train: String,
    pub val: String,
    pub test: String,
    pub nc: usize,
    pub names: Vec<String>,
}

#[derive(Debug)]
pub struct Splits {
    pub train: Vec<String>,
    pub val: Vec<String>,
    pub test: Vec<String>,
}

/// Non-empty trimmed lines of the classes file, in file order.
pub fn read_classes(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read classes file {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Unique image stems in the directory, sorted by filename and de-duplicated
/// preserving first-seen order (a stem exported as both .jpg and .png counts
/// once).
pub fn collect_image_stems(images_dir: &Path) -> Result<Vec<String>> {
    let mut files: Vec<PathBuf> = fs::read_dir(images_dir)
        .with_context(|| format!("failed to read images dir {}", images_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();
    files.sort();

    let mut seen = std::collections::HashSet::new();
    let mut stems = Vec::new();
    for path in files {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if seen.insert(stem.to_string()) {
                stems.push(stem.to_string());
            }
        }
    }
    Ok(stems)
}

/// Seeded shuffle, then carve test and val partitions.
///
/// The test partition is the ceiling of `n * test_size`; val is carved from
/// the remainder at `val_size / (1 - test_size)`, also ceiled, so the split
/// matches the original tool's two-stage carve. Same seed, same partitions.
pub fn split_stems(stems: &[String], test_size: f64, val_size: f64, seed: u64) -> Result<Splits> {
    if !(0.0..1.0).contains(&test_size) || !(0.0..1.0).contains(&val_size) {
        bail!("test_size and val_size must be in [0, 1)");
    }
    if test_size + val_size >= 1.0 {
        bail!("test_size + val_size must leave room for a training set");
    }

    let mut shuffled: Vec<String> = stems.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let n = shuffled.len();
    let test_n = ((n as f64) * test_size).ceil() as usize;
    let test: Vec<String> = shuffled.split_off(n - test_n.min(n));

    let remaining = shuffled.len();
    let val_rel = if test_size < 1.0 {
        val_size / (1.0 - test_size)
    } else {
        0.0
    };
    let val_n = ((remaining as f64) * val_rel).ceil() as usize;
    let val: Vec<String> = shuffled.split_off(remaining - val_n.min(remaining));

    Ok(Splits {
        train: shuffled,
        val,
        test,
    })
}

/// Copy each stem's image and label into the partition directories.
///
/// The first image matching the stem wins (mixed extensions); a missing label
/// becomes an empty .txt; a stem whose image vanished since collection is
/// logged and skipped. Returns the number of pairs copied.
pub fn copy_pairs(
    stems: &[String],
    src_images: &Path,
    src_labels: &Path,
    dst_images: &Path,
    dst_labels: &Path,
) -> Result<usize> {
    let mut copied = 0;
    for stem in stems {
        let Some(src_img) = find_image_for_stem(src_images, stem)? else {
            tracing::warn!(stem = %stem, dir = %src_images.display(), "image for stem not found, skipping");
            continue;
        };

        let file_name = src_img
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("image path has no file name: {}", src_img.display()))?;
        let dst_img = dst_images.join(file_name);
        fs::copy(&src_img, &dst_img)
            .with_context(|| format!("failed to copy image {}", src_img.display()))?;

        let src_label = src_labels.join(format!("{stem}.txt"));
        let dst_label = dst_labels.join(format!("{stem}.txt"));
        if src_label.exists() {
            fs::copy(&src_label, &dst_label)
                .with_context(|| format!("failed to copy label {}", src_label.display()))?;
        } else {
            fs::write(&dst_label, "")
                .with_context(|| format!("failed to write empty label {}", dst_label.display()))?;
        }
        copied += 1;
    }
    Ok(copied)
}

fn find_image_for_stem(dir: &Path, stem: &str) -> Result<Option<PathBuf>> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read images dir {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.file_stem().and_then(|s| s.to_str()) == Some(stem)
        })
        .collect();
    matches.sort();
    Ok(matches.into_iter().next())
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or(0)
}

pub fn run(args: &Args) -> Result<()> {
    let images_dir = args.source_root.join(&args.images_dir);
    let labels_dir = args.source_root.join(&args.labels_dir);
    let classes_path = args.source_root.join(&args.classes);

    if !images_dir.is_dir() {
        bail!("images dir not found: {}", images_dir.display());
    }
    if !labels_dir.is_dir() {
        bail!("labels dir not found: {}", labels_dir.display());
    }
    if !classes_path.is_file() {
        bail!("classes file not found: {}", classes_path.display());
    }

    let names = read_classes(&classes_path)?;
    tracing::info!(count = names.len(), classes = ?names, "loaded classes");

    let stems = collect_image_stems(&images_dir)?;
    tracing::info!(count = stems.len(), "collected unique image stems");

    let splits = split_stems(&stems, args.test_size, args.val_size, args.seed)?;
    tracing::info!(
        train = splits.train.len(),
        val = splits.val.len(),
        test = splits.test.len(),
        "split computed"
    );

    let out_root = &args.out_dir;
    let partitions = [
        ("train", &splits.train),
        ("val", &splits.val),
        ("test", &splits.test),
    ];

    for (name, stems) in partitions {
        let dst_images = out_root.join("images").join(name);
        let dst_labels = out_root.join("labels").join(name);
        fs::create_dir_all(&dst_images)
            .with_context(|| format!("failed to create {}", dst_images.display()))?;
        fs::create_dir_all(&dst_labels)
            .with_context(|| format!("failed to create {}", dst_labels.display()))?;

        let copied = copy_pairs(stems, &images_dir, &labels_dir, &dst_images, &dst_labels)?;
        tracing::info!(partition = name, copied, "copied image/label pairs");
    }

    let manifest = Manifest {
        train: out_root.join("images/train").display().to_string(),
        val: out_root.join("images/val").display().to_string(),
        test: out_root.join("images/test").display().to_string(),
        nc: names.len(),
        names,
    };
    let yaml = serde_yaml::to_string(&manifest).context("failed to serialize manifest")?;
    let manifest_path = out_root.join("data.yaml");
    fs::write(&manifest_path, yaml)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;
    tracing::info!(path = %manifest_path.display(), "wrote manifest");

    tracing::info!(
        root = %out_root.display(),
        train_images = count_files(&out_root.join("images/train")),
        val_images = count_files(&out_root.join("images/val")),
        test_images = count_files(&out_root.join("images/test")),
        "dataset ready"
    );
    Ok(())
}
