use crate::Target;
use crate::session::Session;
use declscope_api::{Declaration, DeclarationOrigin, QualifiedName};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Name")]
    short_name: String,
    #[tabled(rename = "Depth")]
    depth: usize,
}

#[derive(Tabled)]
struct DeclarationRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "Origin")]
    origin: String,
}

impl From<&Declaration> for DeclarationRow {
    fn from(decl: &Declaration) -> Self {
        let origin = match decl.origin {
            DeclarationOrigin::Indexed(file) => format!("index ({})", file),
            DeclarationOrigin::Source(unit) => format!("source ({})", unit),
            DeclarationOrigin::Parsed => "parsed".to_string(),
        };
        Self {
            name: decl.name.to_string(),
            kind: decl.kind.to_string(),
            container: decl.container.to_string(),
            origin,
        }
    }
}

pub fn exists(target: &Target, package: &str) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(&target.manifest, &target.module)?;
    let package = QualifiedName::parse(package)?;

    let exists = session.factory.package_exists(&package)?;
    let eager = session.factory.source_units().contains_package(&package);
    println!("{}: {}", package, if exists { "exists" } else { "missing" });
    if !exists && eager {
        println!("(declared only by source units not yet indexed)");
    }
    Ok(())
}

pub fn packages(target: &Target, under: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(&target.manifest, &target.module)?;

    let packages = match under {
        Some(parent) => {
            let parent = QualifiedName::parse(parent)?;
            session.factory.sub_packages(&parent)?
        }
        None => session.cache.packages(session.module)?.sorted(),
    };

    if packages.is_empty() {
        println!("No packages in {}.", target.module);
        return Ok(());
    }

    let rows: Vec<PackageRow> = packages
        .iter()
        .map(|p| PackageRow {
            package: p.to_string(),
            short_name: p.short_name().to_string(),
            depth: p.depth(),
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

pub fn resolve(
    target: &Target,
    package: &str,
    name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(&target.manifest, &target.module)?;
    let package = QualifiedName::parse(package)?;

    let Some(provider) = session.factory.provider_for_package(&package)? else {
        println!("Package {} does not resolve in {}.", package, target.module);
        return Ok(());
    };

    let kinds: Vec<String> = provider
        .component_kinds()
        .iter()
        .map(|k| format!("{:?}", k).to_lowercase())
        .collect();
    println!("Provider: {}", kinds.join(" + "));

    let declarations = provider.declarations()?;
    let declarations: Vec<&Declaration> = declarations
        .iter()
        .filter(|d| name.is_none_or(|n| d.name == n))
        .collect();

    if declarations.is_empty() {
        println!("No declarations.");
    } else {
        let rows: Vec<DeclarationRow> = declarations.into_iter().map(DeclarationRow::from).collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

pub fn class(target: &Target, fq_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(&target.manifest, &target.module)?;
    let fq_name = QualifiedName::parse(fq_name)?;

    let info = session
        .class(&fq_name)
        .ok_or_else(|| format!("no class named `{}` in the manifest", fq_name))?;
    let provider = session.factory.provider_for_class_like(info);

    println!("{} {}", info.kind, provider.owner());
    let rows: Vec<DeclarationRow> = provider.members().iter().map(DeclarationRow::from).collect();
    if rows.is_empty() {
        println!("No members.");
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}
