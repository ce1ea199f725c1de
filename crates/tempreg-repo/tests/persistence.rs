use bytes::Bytes;
use tempreg_crypto::CryptoSource;
use tempreg_repo::{
    setup, Config, Dataset, Instance, InstanceOptions, Meta, SaveParams, SetupParams, ME,
};
use tempreg_types::DatasetRef;

fn open(root: &std::path::Path) -> Instance {
    Instance::open(
        root.join("qri"),
        InstanceOptions {
            block_store_path: Some(root.join("ipfs")),
        },
    )
    .unwrap()
}

#[test]
fn saved_and_published_versions_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    setup(SetupParams {
        repo_path: dir.path().join("qri"),
        block_store_path: dir.path().join("ipfs"),
        config: Config::default(),
        generator: &CryptoSource,
    })
    .unwrap();

    let saved = {
        let inst = open(dir.path());
        let ds = inst
            .repo()
            .save(SaveParams {
                reference: "me/synths".into(),
                dataset: Dataset {
                    meta: Some(Meta::new("synthesizers", "A list of great types of synthesizers")),
                    ..Default::default()
                },
                body: Bytes::from_static(b"company,name\nmoog,sub 37\n"),
            })
            .unwrap();
        inst.repo().set_publish_status(&ds.to_ref(), true).unwrap();
        ds
    };

    let inst = open(dir.path());
    let r = DatasetRef::new(ME, "synths");
    let loaded = inst.repo().get(&r).unwrap();
    assert_eq!(loaded.path, saved.path);
    assert_eq!(loaded.meta.unwrap().title, "synthesizers");
    assert!(inst.repo().is_published(&r).unwrap());
    assert_eq!(inst.repo().body_rows(&r).unwrap(), vec![vec!["moog", "sub 37"]]);
    loaded_signature_checks(&inst, &r);
}

fn loaded_signature_checks(inst: &Instance, r: &DatasetRef) {
    let ds = inst.repo().get(r).unwrap();
    ds.verify_signature(&inst.repo().verifying_key()).unwrap();
}
