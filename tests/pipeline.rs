use breastcanai::*;
use std::path::Path;

fn shipped_model() -> LoadedModel {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("model/model.json");
    LoadedModel::load(path).unwrap()
}

fn describe(smiles: &str) -> DescriptorVector {
    match submit(smiles) {
        Submission::Valid { molecule, .. } => DescriptorVector::compute(&molecule),
        other => panic!("{smiles} did not validate: {other:?}"),
    }
}

#[test]
fn test_aspirin_descriptors() {
    let aspirin = describe("CC(=O)Oc1ccccc1C(=O)O");
    assert!((aspirin.mol_wt - 180.16).abs() < 0.01);
    assert_eq!(aspirin.hbd, 1.0);
    assert_eq!(aspirin.hba, 3.0);
    assert_eq!(aspirin.num_rings, 1.0);
    assert!((0.0..=1.0).contains(&aspirin.qed));
}

#[test]
fn test_small_molecules() {
    let ethanol = describe("CCO");
    assert!((ethanol.mol_wt - 46.069).abs() < 0.01);
    assert_eq!((ethanol.hbd, ethanol.hba, ethanol.rotatable_bonds), (1.0, 1.0, 0.0));
    assert_eq!(ethanol.num_rings, 0.0);

    let paracetamol = describe("CC(=O)Nc1ccc(O)cc1");
    assert!((paracetamol.mol_wt - 151.165).abs() < 0.01);
    assert!((paracetamol.tpsa - 49.33).abs() < 0.01);
    assert_eq!(paracetamol.hbd, 2.0);
    assert_eq!(paracetamol.rotatable_bonds, 0.0);

    let caffeine = describe("CN1C=NC2=C1C(=O)N(C(=O)N2C)C");
    assert!((caffeine.mol_wt - 194.194).abs() < 0.01);
    assert_eq!(caffeine.hbd, 0.0);
    assert_eq!(caffeine.rotatable_bonds, 0.0);
    assert_eq!(caffeine.num_rings, 2.0);
}

#[test]
fn test_kekule_and_aromatic_agree() {
    assert_eq!(describe("C1=CC=CC=C1"), describe("c1ccccc1"));
}

#[test]
fn test_wildcard_and_metals() {
    let methyl = describe("*C");
    assert!((methyl.mol_wt - 15.035).abs() < 0.01);
    assert!((describe("[Pd]").mol_wt - 106.42).abs() < 0.01);
    assert!((describe("[Gd+3]").mol_wt - 157.25).abs() < 0.01);
}

#[test]
fn test_empty_and_invalid_inputs() {
    assert!(matches!(submit(""), Submission::Empty));
    assert!(matches!(submit("   "), Submission::Empty));
    for bad in [
        "C1CC",
        "CC(C",
        "CC)",
        "[Xx]",
        "C==C",
        "c1cc",
        "Q",
        "C%",
        "c1cccc1",
        "c1ccc(C)(C)cc1",
        "[NH255+][H]",
    ] {
        assert!(
            matches!(submit(bad), Submission::Invalid { .. }),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn test_shipped_model_scores() {
    let model = shipped_model();
    assert_eq!(model.feature_order(), FEATURE_NAMES);
    assert!(model.note().is_some_and(|note| note.contains("not fitted")));

    let screener = Screener::new(&model);
    for smiles in ["CC(=O)Oc1ccccc1C(=O)O", "CCO", "CN1C=NC2=C1C(=O)N(C(=O)N2C)C"] {
        let outcome = screener.describe(smiles);
        let prediction = screener.predict(outcome.descriptors().unwrap());
        let verdict = prediction.verdict().unwrap();
        assert!((0.0..=100.0).contains(&verdict.percentage));
        assert_eq!(verdict.band, Band::of(verdict.percentage));
    }
}

#[test]
fn test_repeated_predictions_match() {
    let model = shipped_model();
    let screener = Screener::new(&model);
    let descriptors = describe("CC(C)Cc1ccc(cc1)C(C)C(=O)O");
    let first = screener.predict(&descriptors);
    for _ in 0..3 {
        assert_eq!(screener.predict(&descriptors), first);
    }
}
