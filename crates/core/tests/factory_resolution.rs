//! Package resolution through the declaration provider factory

mod common;

use common::{class, fixture, function, name, names, source_unit, Fixture};
use declscope_api::{
    ClassLikeInfo, ClassMemberDeclarationProvider, ClassMemberProviderFactory, Declaration,
    DeclarationKind, DeclarationOrigin, DeclarationStub, ModuleId, QualifiedName, SourceUnit,
};
use declscope_core::{
    DeclarationProviderFactory, DeclscopeError, ExistenceProbe, ProviderKind, ReportPhase,
};
use std::sync::Arc;

fn factory(fx: &Fixture, module: ModuleId, units: Vec<SourceUnit>) -> DeclarationProviderFactory {
    DeclarationProviderFactory::new(module, units, fx.services.clone(), Arc::clone(&fx.cache))
        .unwrap()
}

#[test]
fn test_merged_provider_yields_indexed_then_eager() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "B.kt", name("p"), vec![class("B")]);

    let factory = factory(&fx, module, vec![source_unit(0, "p", vec![class("A")])]);
    let provider = factory.provider_for_package(&name("p")).unwrap().unwrap();

    assert_eq!(provider.kind(), ProviderKind::Combined);
    assert_eq!(
        provider.component_kinds(),
        vec![ProviderKind::Indexed, ProviderKind::Eager]
    );
    assert_eq!(names(&provider.declarations().unwrap()), vec!["B", "A"]);
}

#[test]
fn test_single_source_is_returned_unwrapped() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "I.kt", name("indexed.only"), vec![class("I")]);

    let factory = factory(&fx, module, vec![source_unit(0, "eager.only", vec![class("E")])]);

    let indexed = factory
        .provider_for_package(&name("indexed.only"))
        .unwrap()
        .unwrap();
    assert_eq!(indexed.kind(), ProviderKind::Indexed);

    let eager = factory
        .provider_for_package(&name("eager.only"))
        .unwrap()
        .unwrap();
    assert_eq!(eager.kind(), ProviderKind::Eager);

    assert!(factory.provider_for_package(&name("nowhere")).unwrap().is_none());
}

#[test]
fn test_parent_package_resolves_without_declarations() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "C.kt", name("a.b.c"), vec![class("C")]);

    let factory = factory(&fx, module, vec![]);
    let provider = factory.provider_for_package(&name("a.b")).unwrap().unwrap();
    assert_eq!(provider.kind(), ProviderKind::Indexed);
    assert!(provider.declarations().unwrap().is_empty());
}

#[test]
fn test_missing_package_builds_no_indexed_provider() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "A.kt", name("a"), vec![class("A")]);

    let factory = factory(&fx, module, vec![]);
    for missing in ["x", "a.x", "x.y.z"] {
        assert!(factory.provider_for_package(&name(missing)).unwrap().is_none());
        assert_eq!(fx.index.declaration_queries_for(&name(missing)), 0);
    }
    assert_eq!(factory.indexed_providers_created(), 0);
    assert_eq!(fx.index.call_counts().declaration_queries, 0);
}

#[test]
fn test_indexed_provider_is_lazy_and_reused_until_change() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "A.kt", name("p"), vec![class("A")]);

    let factory = factory(&fx, module, vec![]);
    let first = factory.provider_for_package(&name("p")).unwrap().unwrap();
    assert_eq!(fx.index.declaration_queries_for(&name("p")), 0);

    first.declarations().unwrap();
    first.declarations().unwrap();
    assert_eq!(fx.index.declaration_queries_for(&name("p")), 1);

    factory.provider_for_package(&name("p")).unwrap().unwrap();
    assert_eq!(factory.indexed_providers_created(), 1);

    fx.index
        .add_source_file(module, "A2.kt", name("p"), vec![class("A2")]);
    let refreshed = factory.provider_for_package(&name("p")).unwrap().unwrap();
    assert_eq!(factory.indexed_providers_created(), 2);
    assert_eq!(names(&refreshed.declarations().unwrap()), vec!["A", "A2"]);
}

#[test]
fn test_end_to_end_eager_package_bypasses_existence_gate() {
    let fx = fixture();
    let module = fx.index.add_module("M");
    fx.index
        .add_source_file(module, "B.kt", name("a.b"), vec![class("B")]);
    fx.index
        .add_source_file(module, "C.kt", name("a.b.c"), vec![class("C")]);

    let factory = factory(&fx, module, vec![source_unit(0, "a.b.d", vec![class("D")])]);

    assert!(factory.package_exists(&name("a")).unwrap());
    assert!(factory.package_exists(&name("a.b.c")).unwrap());
    // Eager units never feed the existence set.
    assert!(!factory.package_exists(&name("a.b.d")).unwrap());

    let provider = factory.provider_for_package(&name("a.b.d")).unwrap().unwrap();
    assert_eq!(provider.kind(), ProviderKind::Eager);
    assert_eq!(names(&provider.declarations().unwrap()), vec!["D"]);
    assert_eq!(fx.index.declaration_queries_for(&name("a.b.d")), 0);

    assert_eq!(
        factory.sub_packages(&name("a.b")).unwrap(),
        vec![name("a.b.c")]
    );
}

#[test]
fn test_unit_in_both_sources_is_not_deduplicated() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "Shared.kt", name("p"), vec![class("Shared")]);

    // Violates the partition precondition on purpose.
    let factory = factory(&fx, module, vec![source_unit(0, "p", vec![class("Shared")])]);
    let provider = factory.provider_for_package(&name("p")).unwrap().unwrap();
    let decls = provider.declarations().unwrap();

    assert_eq!(decls.len(), 2);
    assert!(matches!(decls[0].origin, DeclarationOrigin::Indexed(_)));
    assert!(matches!(decls[1].origin, DeclarationOrigin::Source(_)));

    let first = provider.first_named("Shared").unwrap().unwrap();
    assert!(matches!(first.origin, DeclarationOrigin::Indexed(_)));
}

#[test]
fn test_classes_and_members_are_split_by_kind() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index.add_source_file(
        module,
        "Util.kt",
        name("util"),
        vec![class("Helper"), function("helper"), DeclarationStub::new("Alias", DeclarationKind::TypeAlias)],
    );

    let factory = factory(&fx, module, vec![source_unit(0, "util", vec![function("scratch")])]);
    let provider = factory.provider_for_package(&name("util")).unwrap().unwrap();

    assert_eq!(names(&provider.classes_named("Helper").unwrap()), vec!["Helper"]);
    assert!(provider.classes_named("helper").unwrap().is_empty());
    assert_eq!(names(&provider.members_named("scratch").unwrap()), vec!["scratch"]);
    assert_eq!(names(&provider.members_named("Alias").unwrap()), vec!["Alias"]);
}

#[test]
fn test_class_like_provider_is_scope_independent() {
    let fx = fixture();
    let module = fx.index.add_module("empty");
    let factory = factory(&fx, module, vec![]);

    let info = ClassLikeInfo {
        fq_name: name("x.y.Widget"),
        kind: DeclarationKind::Class,
        members: vec![function("draw"), class("Builder")],
    };
    let provider = factory.provider_for_class_like(&info);

    assert_eq!(provider.owner(), &name("x.y.Widget"));
    assert_eq!(names(&provider.members()), vec!["draw", "Builder"]);
    assert_eq!(fx.index.call_counts().index_calls(), 0);
}

#[test]
fn test_source_unit_resolves_to_its_package() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    let unit = source_unit(3, "fresh", vec![class("New")]);
    let factory = factory(&fx, module, vec![unit.clone()]);

    let provider = factory.provider_for_source_unit(&unit).unwrap();
    assert_eq!(provider.package(), &name("fresh"));
}

#[test]
fn test_missing_package_fragment_carries_both_reports() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "A.kt", name("a"), vec![class("A")]);

    let factory = factory(&fx, module, vec![source_unit(0, "a", vec![class("Scratch")])]);
    assert!(factory.package_exists(&name("a")).unwrap());

    // A unit the factory was never told about, in a package nobody indexes.
    let stray = source_unit(9, "ghost", vec![class("Ghost")]);
    fx.index.touch(module);

    let err = factory.provider_for_source_unit(&stray).err().unwrap();
    let DeclscopeError::MissingPackageFragment {
        package,
        on_creation,
        on_failure,
    } = err
    else {
        panic!("expected a missing package fragment");
    };

    assert_eq!(package, name("ghost"));
    assert_eq!(on_creation.phase, ReportPhase::Creation);
    assert_eq!(on_failure.phase, ReportPhase::Failure);
    assert_eq!(on_failure.failing_package, Some(name("ghost")));
    assert_eq!(on_failure.package_in_source_units, Some(false));
    assert_eq!(on_failure.fresh_existence, Some(ExistenceProbe::Exists(false)));
    assert_eq!(on_failure.cached_existence, Some(false));
    assert_eq!(on_failure.scope, on_creation.scope);
    assert_eq!(on_failure.scope, factory.scope().token());
    assert!(on_failure.tracker_value > on_creation.tracker_value);
    assert_eq!(on_failure.source_units.len(), 1);
    assert_eq!(on_failure.source_units[0].display_name, "Scratch0.kt");
    assert_eq!(on_failure.source_units[0].modification_stamp, 100);
    assert!(!on_failure.is_stale_cache());
}

#[test]
fn test_report_tells_stale_cache_from_genuine_absence() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    let file = fx
        .index
        .add_source_file(module, "Gone.kt", name("gone"), vec![class("Gone")]);

    let factory = factory(&fx, module, vec![]);
    assert!(factory.package_exists(&name("gone")).unwrap());
    let tag = fx.cache.cached_tag(module);

    fx.index.remove_file(module, file);
    let report = factory.report(&name("gone"));

    assert_eq!(report.cached_existence, Some(true));
    assert_eq!(report.fresh_existence, Some(ExistenceProbe::Exists(false)));
    assert!(report.is_stale_cache());
    // Reporting must not refresh the cache.
    assert_eq!(fx.cache.cached_tag(module), tag);
}

#[test]
fn test_report_records_unavailable_index() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "A.kt", name("a"), vec![]);
    let factory = factory(&fx, module, vec![]);

    fx.index.set_available(false);
    let report = factory.report(&name("a"));
    assert!(matches!(
        report.fresh_existence,
        Some(ExistenceProbe::Unavailable(_))
    ));

    let err = factory.provider_for_package(&name("a")).err().unwrap();
    assert!(matches!(err, DeclscopeError::Index(_)));
}

#[test]
fn test_creation_report_snapshots_units_in_order() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    let factory = factory(
        &fx,
        module,
        vec![
            source_unit(2, "b", vec![]),
            source_unit(1, "a", vec![]),
        ],
    );

    assert_eq!(factory.module(), module);
    let report = factory.creation_report();
    let displayed: Vec<_> = report
        .source_units
        .iter()
        .map(|u| u.display_name.as_str())
        .collect();
    assert_eq!(displayed, vec!["Scratch2.kt", "Scratch1.kt"]);
    assert!(report.source_units[0].is_physical);
    assert!(!report.source_units[1].is_physical);
    assert_eq!(report.failing_package, None);

    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["phase"], "creation");
}

#[test]
fn test_required_provider_turns_absence_into_error() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    fx.index
        .add_source_file(module, "A.kt", name("a"), vec![class("A")]);
    let factory = factory(&fx, module, vec![]);

    assert!(factory.require_provider_for_package(&name("a")).is_ok());
    let err = factory.require_provider_for_package(&name("b")).err().unwrap();
    assert!(matches!(
        err,
        DeclscopeError::MissingPackageFragment { ref package, .. } if *package == name("b")
    ));
    assert!(err.to_string().contains("`b`"));
}

#[derive(Debug)]
struct NoMembers(QualifiedName);

impl ClassMemberDeclarationProvider for NoMembers {
    fn owner(&self) -> &QualifiedName {
        &self.0
    }

    fn members(&self) -> Vec<Declaration> {
        Vec::new()
    }
}

struct NoMembersFactory;

impl ClassMemberProviderFactory for NoMembersFactory {
    fn provider_for(&self, info: &ClassLikeInfo) -> Arc<dyn ClassMemberDeclarationProvider> {
        Arc::new(NoMembers(info.fq_name.clone()))
    }
}

#[test]
fn test_class_member_factory_is_pluggable() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    let services = fx.services.clone().with_class_members(Arc::new(NoMembersFactory));
    let factory = DeclarationProviderFactory::new(
        module,
        Vec::<SourceUnit>::new(),
        services,
        Arc::clone(&fx.cache),
    )
    .unwrap();

    let info = ClassLikeInfo {
        fq_name: name("x.Widget"),
        kind: DeclarationKind::Class,
        members: vec![function("draw")],
    };
    let provider = factory.provider_for_class_like(&info);
    assert_eq!(provider.owner(), &name("x.Widget"));
    assert!(provider.members().is_empty());
}

#[test]
fn test_memory_pressure_releases_loaded_providers() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    let files: Vec<_> = (0..50)
        .map(|i| {
            fx.index
                .add_source_file(module, format!("P{i}.kt"), name(&format!("p{i}")), vec![class("C")])
        })
        .collect();

    let factory = factory(&fx, module, vec![]);
    for i in 0..50 {
        let provider = factory
            .provider_for_package(&name(&format!("p{i}")))
            .unwrap()
            .unwrap();
        assert_eq!(provider.declarations().unwrap().len(), 1);
    }
    assert_eq!(factory.indexed_providers_cached(), 50);

    assert_eq!(factory.on_memory_pressure(), (1, 50));
    assert_eq!(factory.indexed_providers_cached(), 0);
    assert_eq!(fx.cache.stats().cached_modules, 0);

    for file in files {
        fx.index.remove_file(module, file);
    }
    for i in 0..50 {
        assert!(factory.provider_for_package(&name(&format!("p{i}"))).unwrap().is_none());
    }
    assert_eq!(factory.indexed_providers_cached(), 0);
}

#[test]
fn test_packages_that_disappear_release_their_providers() {
    let fx = fixture();
    let module = fx.index.add_module("app");
    let files: Vec<_> = (0..10)
        .map(|i| fx.index.add_source_file(module, format!("P{i}.kt"), name(&format!("p{i}")), vec![]))
        .collect();

    let factory = factory(&fx, module, vec![]);
    for i in 0..10 {
        factory.provider_for_package(&name(&format!("p{i}"))).unwrap().unwrap();
    }
    assert_eq!(factory.indexed_providers_cached(), 10);

    for file in files {
        fx.index.remove_file(module, file);
    }
    for i in 0..10 {
        assert!(factory.provider_for_package(&name(&format!("p{i}"))).unwrap().is_none());
    }
    assert_eq!(factory.indexed_providers_cached(), 0);
}
