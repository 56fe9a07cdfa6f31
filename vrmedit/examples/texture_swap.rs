//! Inspect a VRM container and optionally swap one embedded texture.
//!
//! Usage: texture_swap <avatar.vrm> [image-name new-image.png [out.vrm]]

use std::path::{Path, PathBuf};

use vrmedit::{ImageTarget, VrmContainer};

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(input) = args.first().map(PathBuf::from) else {
        eprintln!("usage: texture_swap <avatar.vrm> [image-name new-image.png [out.vrm]]");
        std::process::exit(2);
    };

    let bytes = std::fs::read(&input).expect("read input");
    let mut container = VrmContainer::parse(&bytes).expect("parse container");
    if let Some(name) = input.file_name().and_then(|n| n.to_str()) {
        container.set_file_name(name);
    }

    let header = container.header();
    println!(
        "{}: glTF version {}, {} bytes total",
        input.display(),
        header.version,
        header.length
    );
    for image in container.images() {
        println!(
            "  image bufferView={} name={} mime={} size={}",
            image.index,
            image.name.as_deref().unwrap_or("-"),
            image.mime_type.as_deref().unwrap_or("-"),
            image.size()
        );
    }
    if let Some(offset) = container.first_person_offset() {
        println!("  firstPersonBoneOffset: {offset:?}");
    }

    let (Some(name), Some(replacement)) = (args.get(1), args.get(2)) else {
        return;
    };
    let new_bytes = std::fs::read(Path::new(replacement)).expect("read replacement image");
    container
        .replace_image(&ImageTarget::by_name(name.clone()), &new_bytes)
        .expect("replace image");

    let out_path = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(container.file_name().unwrap_or("out.vrm")));
    std::fs::write(&out_path, container.to_bytes()).expect("write output");
    println!(
        "replaced '{name}' ({} bytes) -> {}",
        new_bytes.len(),
        out_path.display()
    );
}
