//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `kernelspec_core` linkage without a host runtime.
//! - Print a deterministic resolution for a small demo registry.

use kernelspec_core::{ComputeCapability, MultiKernelLoaderSpec, ResolvedKernelImage};

fn main() {
    println!("kernelspec_core ping={}", kernelspec_core::ping());
    println!("kernelspec_core version={}", kernelspec_core::core_version());

    let mut spec = MultiKernelLoaderSpec::new(3);
    spec.add_in_memory_text_versions([(7, 0, "// sm_70"), (8, 0, "// sm_80")], "demo_saxpy")
        .add_on_disk_binary("demo_saxpy.cubin", "demo_saxpy");

    for capability in ["7.0", "8.0", "sm_90"] {
        let Ok(capability) = capability.parse::<ComputeCapability>() else {
            continue;
        };
        match spec.resolve(Some(capability)) {
            Some(kernel) => println!(
                "resolve capability={} kernel={} kind={} image={}",
                capability,
                kernel.kernel_name,
                kernel.kind,
                describe(&kernel.image)
            ),
            None => println!("resolve capability={capability} image=none"),
        }
    }
}

fn describe(image: &ResolvedKernelImage<'_>) -> String {
    match image {
        ResolvedKernelImage::Binary(bytes) => format!("binary:{}B", bytes.len()),
        ResolvedKernelImage::Text(text) => {
            format!("text:{}", text.to_str().unwrap_or("<non-utf8>"))
        }
        ResolvedKernelImage::BinaryFile(path) => format!("binary_file:{}", path.display()),
        ResolvedKernelImage::TextFile(path) => format!("text_file:{}", path.display()),
        ResolvedKernelImage::Symbol(address) => format!("symbol:{:#x}", address.addr()),
    }
}
