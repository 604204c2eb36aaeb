//! Full crawls over a small archive tree.

use std::fs;
use std::path::{Path, PathBuf};

use harvest_config::{CrawlConfig, HarvestConfig, ObjectTypeConfig};
use harvest_core::{MetadataRecord, ProblemKind, RunStatistics};
use harvest_crawl::{ChecksumManifest, CrawlCheckpoint, Crawler};
use harvest_label::Policy;
use pretty_assertions::assert_eq;

fn product(root: &str, lid: &str, class: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<{root} xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>{lid}</logical_identifier>
    <version_id>1.0</version_id>
    <title>{lid}</title>
    <product_class>{class}</product_class>
  </Identification_Area>
{body}
</{root}>"#
    )
}

const REFERENCE: &str = r"  <Reference_List>
    <Internal_Reference>
      <lid_reference>urn:nasa:pds:t:context:mission</lid_reference>
      <reference_type>data_to_investigation</reference_type>
    </Internal_Reference>
  </Reference_List>";

const INVENTORY: &str = r"  <Collection><collection_type>Data</collection_type></Collection>
  <File_Area_Inventory>
    <File><file_name>collection_data_inventory.csv</file_name></File>
    <Inventory>
      <field_delimiter>Comma</field_delimiter>
      <Record_Delimited>
        <Field_Delimited><name>Member_Status</name><field_number>1</field_number></Field_Delimited>
        <Field_Delimited><name>LIDVID_LID</name><field_number>2</field_number></Field_Delimited>
      </Record_Delimited>
    </Inventory>
  </File_Area_Inventory>";

const CATALOG: &str = r#"PDS_VERSION_ID = PDS3
OBJECT = MISSION
  MISSION_NAME = "TEST MISSION"
END_OBJECT = MISSION
END
"#;

struct Archive {
    _dir: tempfile::TempDir,
    modern: PathBuf,
    legacy: PathBuf,
}

fn archive() -> Archive {
    let dir = tempfile::tempdir().unwrap();
    let modern = dir.path().join("bundle");
    let legacy = dir.path().join("catalog");
    let data = modern.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::create_dir_all(&legacy).unwrap();

    let write = |path: &Path, text: &str| fs::write(path, text).unwrap();
    write(
        &modern.join("bundle.xml"),
        &product(
            "Product_Bundle",
            "urn:nasa:pds:t",
            "Product_Bundle",
            r"  <Bundle><bundle_type>Archive</bundle_type></Bundle>
  <Bundle_Member_Entry>
    <lid_reference>urn:nasa:pds:t:data</lid_reference>
    <reference_type>bundle_has_data_collection</reference_type>
  </Bundle_Member_Entry>",
        ),
    );
    write(
        &data.join("a.xml"),
        &product(
            "Product_Observational",
            "urn:nasa:pds:t:data:a",
            "Product_Observational",
            &format!(
                "{REFERENCE}\n  <File_Area_Observational><File><file_name>a.tab</file_name>\
                 <md5_checksum>d41d8cd98f00b204e9800998ecf8427e</md5_checksum></File>\
                 </File_Area_Observational>"
            ),
        ),
    );
    write(&data.join("broken.xml"), "<Product_Observational><oops></Product_Observational>");
    write(
        &data.join("collection_data.xml"),
        &product(
            "Product_Collection",
            "urn:nasa:pds:t:data",
            "Product_Collection",
            INVENTORY,
        ),
    );
    write(
        &data.join("collection_data_inventory.csv"),
        "P,urn:nasa:pds:t:data:a::1.0\r\nS,urn:nasa:pds:t:data:secondary\r\n",
    );
    write(
        &data.join("invalid.xml"),
        r"<Product_Observational>
  <Wrapper>
    <Identification_Area>
      <product_class>Product_Observational</product_class>
    </Identification_Area>
  </Wrapper>
</Product_Observational>",
    );
    write(
        &data.join("secondary.xml"),
        &product(
            "Product_Observational",
            "urn:nasa:pds:t:data:secondary",
            "Product_Observational",
            REFERENCE,
        ),
    );
    write(
        &data.join("thumb.xml"),
        &product("Product_Thumbnail", "urn:nasa:pds:t:data:thumb", "Product_Thumbnail", ""),
    );
    write(&legacy.join("mission.cat"), CATALOG);

    Archive {
        _dir: dir,
        modern,
        legacy,
    }
}

fn policy() -> Policy {
    let mut config = HarvestConfig::default();
    for name in ["Product_Bundle", "Product_Collection", "Product_Observational"] {
        config.policy.object_types.push(ObjectTypeConfig {
            name: name.into(),
            rules: vec![],
        });
    }
    Policy::compile(&config).unwrap()
}

fn crawl_config(archive: &Archive, persist: bool) -> CrawlConfig {
    CrawlConfig {
        roots: vec![archive.modern.clone()],
        legacy_roots: vec![archive.legacy.clone()],
        collections: vec![archive.modern.join("data/collection_data.xml")],
        persist,
        ..CrawlConfig::default()
    }
}

fn file_name(source: &str) -> String {
    Path::new(source)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

#[test]
fn classifies_every_candidate_once() {
    let archive = archive();
    let policy = policy();
    let crawler = Crawler::new(&policy, &crawl_config(&archive, false)).unwrap();

    let mut sink: Vec<MetadataRecord> = Vec::new();
    let outcome = crawler.run(&mut CrawlCheckpoint::new(), &mut sink).unwrap();

    // good: bundle, a, collection, invalid, mission; bad: broken;
    // skipped: secondary (inventory), thumb (unknown type)
    assert_eq!(
        outcome.statistics,
        RunStatistics {
            good: 5,
            bad: 1,
            skipped: 2
        }
    );

    let items: Vec<String> = outcome.items.iter().map(|i| file_name(&i.source)).collect();
    assert_eq!(
        items,
        vec![
            "bundle.xml",
            "a.xml",
            "broken.xml",
            "collection_data.xml",
            "invalid.xml",
            "mission.cat",
        ]
    );

    let broken = &outcome.items[2];
    assert_eq!(broken.problems.len(), 1);
    assert_eq!(broken.problems[0].kind, ProblemKind::ParseFailure);

    let invalid = &outcome.items[4];
    assert_eq!(invalid.problems.len(), 1);
    assert!(invalid.problems[0].is_structural());

    // The structurally invalid label yields no record.
    assert_eq!(outcome.records.len(), 4);
    assert_eq!(sink, outcome.records);
}

#[test]
fn second_incremental_crawl_processes_nothing() {
    let archive = archive();
    let policy = policy();
    let crawler = Crawler::new(&policy, &crawl_config(&archive, true)).unwrap();
    let mut checkpoint = CrawlCheckpoint::new();

    let first = crawler.run(&mut checkpoint, &mut Vec::new()).unwrap();
    assert_eq!(first.statistics.total(), 8);

    let second = crawler.run(&mut checkpoint, &mut Vec::new()).unwrap();
    assert_eq!(second.statistics, RunStatistics::default());
    assert!(second.items.is_empty());
    assert!(second.records.is_empty());
}

#[test]
fn records_are_deterministic() {
    let archive = archive();
    let policy = policy();
    let crawler = Crawler::new(&policy, &crawl_config(&archive, false)).unwrap();

    let render = || {
        let outcome = crawler.run(&mut CrawlCheckpoint::new(), &mut Vec::new()).unwrap();
        serde_json::to_string(&outcome.records).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn manifest_mismatches_become_problems() {
    let archive = archive();
    let policy = policy();
    let manifest = ChecksumManifest::parse(
        "ffffffffffffffffffffffffffffffff  data/a.tab\n",
        &archive.modern,
    )
    .unwrap();
    let config = CrawlConfig {
        legacy_roots: vec![],
        ..crawl_config(&archive, false)
    };
    let crawler = Crawler::new(&policy, &config).unwrap().with_manifest(manifest);

    let outcome = crawler.run(&mut CrawlCheckpoint::new(), &mut Vec::new()).unwrap();
    let a = outcome
        .items
        .iter()
        .find(|item| item.source.ends_with("a.xml"))
        .unwrap();
    let kinds: Vec<ProblemKind> = a.problems.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![ProblemKind::ChecksumMismatch]);
}

#[test]
fn failed_crawl_leaves_the_checkpoint_untouched() {
    let archive = archive();
    let policy = policy();
    let missing = archive.legacy.join("later");
    let config = CrawlConfig {
        roots: vec![],
        legacy_roots: vec![archive.legacy.clone(), missing.clone()],
        collections: vec![],
        persist: true,
        ..CrawlConfig::default()
    };
    let crawler = Crawler::new(&policy, &config).unwrap();
    let mut checkpoint = CrawlCheckpoint::new();

    assert!(crawler.run(&mut checkpoint, &mut Vec::new()).is_err());
    assert!(checkpoint.is_empty());

    fs::create_dir_all(&missing).unwrap();
    let retry = crawler.run(&mut checkpoint, &mut Vec::new()).unwrap();
    let items: Vec<String> = retry.items.iter().map(|i| file_name(&i.source)).collect();
    assert_eq!(items, vec!["mission.cat"]);
    assert_eq!(retry.statistics.good, 1);
    assert_eq!(checkpoint.len(), 1);
}
