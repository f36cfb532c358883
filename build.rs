use std::collections::HashSet;
use std::path::Path;

fn main() {
    let catalog_path = Path::new("catalogs/mismatch_sites.json");
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    // Ensure catalog exists at build time
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the mismatch site catalog before building.\n",
        catalog_path.display()
    );

    let catalog_contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    let catalog: serde_json::Value = serde_json::from_str(&catalog_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n\
         Got: {catalog}\n"
    );

    let sites = catalog.get("sites").unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Missing 'sites' field\n\
             The catalog must have a top-level 'sites' array.\n"
        );
    });

    let sites = sites.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: 'sites' must be an array\n\
             Got: {sites}\n"
        );
    });

    let mut keys = HashSet::new();
    for (i, site) in sites.iter().enumerate() {
        validate_site(site, i, &mut keys);
    }

    println!(
        "cargo:warning=Validated mismatch catalog: {} sites",
        sites.len()
    );
}

fn validate_site(site: &serde_json::Value, index: usize, keys: &mut HashSet<(String, u64)>) {
    for field in ["source_chrom", "target_chrom"] {
        assert!(
            site.get(field).and_then(|v| v.as_str()).is_some(),
            "\n\nCATALOG BUILD ERROR: Site at index {index} missing '{field}' field\n"
        );
    }

    for field in ["source_pos", "target_pos"] {
        let pos = site.get(field).and_then(serde_json::Value::as_u64);
        assert!(
            matches!(pos, Some(p) if p > 0),
            "\n\nCATALOG BUILD ERROR: Site at index {index} has missing or zero '{field}'\n\
             Positions are 1-based and must be > 0.\n"
        );
    }

    for field in ["source_base", "target_base"] {
        let base = site.get(field).and_then(|v| v.as_str()).unwrap_or("");
        assert!(
            matches!(base, "A" | "C" | "G" | "T"),
            "\n\nCATALOG BUILD ERROR: Site at index {index} has invalid '{field}': '{base}'\n\
             Bases must be a single A, C, G or T.\n"
        );
    }

    let chrom = site["source_chrom"].as_str().unwrap_or_default().to_string();
    let pos = site["source_pos"].as_u64().unwrap_or_default();
    assert!(
        keys.insert((chrom.clone(), pos)),
        "\n\nCATALOG BUILD ERROR: Duplicate site {chrom}:{pos} (index {index})\n"
    );
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed=catalogs/mismatch_sites.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
