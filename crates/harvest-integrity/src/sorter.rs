use harvest_core::MetadataRecord;

const DATA_SET: &str = "DATA_SET";
const DATA_SET_COLLECTION: &str = "DATA_SET_COLLECTION";

/// Records split into parents and children for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition<'a> {
    pub parents: Vec<&'a MetadataRecord>,
    pub children: Vec<&'a MetadataRecord>,
}

fn declares(record: &MetadataRecord, object: &str) -> bool {
    record
        .data_classes
        .iter()
        .any(|class| class.eq_ignore_ascii_case(object))
}

/// Classify `records` for `category`.
///
/// A record declaring the category's object is a parent. For the data set
/// category, a data set collection record is both parent and child.
#[must_use]
pub fn partition<'a>(records: &'a [MetadataRecord], category: &str) -> Partition<'a> {
    let mut split = Partition::default();
    let data_set = category.eq_ignore_ascii_case(DATA_SET);
    for record in records {
        if declares(record, category) {
            split.parents.push(record);
        } else if data_set && declares(record, DATA_SET_COLLECTION) {
            split.parents.push(record);
            split.children.push(record);
        } else {
            split.children.push(record);
        }
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(source: &str, classes: &[&str]) -> MetadataRecord {
        MetadataRecord {
            source: source.into(),
            identifier: None,
            title: None,
            object_type: "Product_Proxy_PDS3".into(),
            data_classes: classes.iter().map(|c| (*c).to_string()).collect(),
            references: vec![],
            slots: vec![],
        }
    }

    fn sources(records: &[&MetadataRecord]) -> Vec<String> {
        records.iter().map(|r| r.source.clone()).collect()
    }

    #[test]
    fn parents_declare_the_category_object() {
        let records = vec![
            record("mission.cat", &["MISSION"]),
            record("inst.cat", &["INSTRUMENT"]),
            record("ref.cat", &["reference"]),
        ];
        let split = partition(&records, "MISSION");
        assert_eq!(sources(&split.parents), vec!["mission.cat"]);
        assert_eq!(sources(&split.children), vec!["inst.cat", "ref.cat"]);

        let split = partition(&records, "REFERENCE");
        assert_eq!(sources(&split.parents), vec!["ref.cat"]);
    }

    #[test]
    fn data_set_collection_is_parent_and_child_for_data_sets() {
        let records = vec![
            record("dataset.cat", &["DATA_SET"]),
            record("dscoll.cat", &["DATA_SET_COLLECTION"]),
            record("mission.cat", &["MISSION"]),
        ];
        let split = partition(&records, "DATA_SET");
        assert_eq!(sources(&split.parents), vec!["dataset.cat", "dscoll.cat"]);
        assert_eq!(sources(&split.children), vec!["dscoll.cat", "mission.cat"]);

        let split = partition(&records, "MISSION");
        assert_eq!(sources(&split.children), vec!["dataset.cat", "dscoll.cat"]);
    }
}
