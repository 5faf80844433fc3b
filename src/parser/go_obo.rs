use std::io::Read;
use std::path::Path;

use tracing::{trace, warn};

use crate::parser::open_reader;
use crate::term::internal::GoTermInternal;
use crate::term::Aspect;
use crate::{GoError, GoResult, GoTermId, Ontology};

type Connections = Vec<(GoTermId, GoTermId)>;

/// Reads `go-basic.obo` into the ontology
///
/// Obsolete terms are skipped. `is_a` and `part_of` relationships are both
/// treated as parent connections, as they are in `go-basic.obo`, which is
/// guaranteed to be acyclic for these two relations.
///
/// # Errors
///
/// - [`GoError::CannotOpenFile`]: the file is missing
/// - [`GoError::InvalidInput`]: the file is not valid UTF-8 or a term has an invalid ID
pub(crate) fn read_obo_file<P: AsRef<Path>>(filename: P, ontology: &mut Ontology) -> GoResult<()> {
    let display = filename.as_ref().display().to_string();
    let mut file_content = String::new();
    open_reader(filename)?
        .read_to_string(&mut file_content)
        .map_err(|_| GoError::InvalidInput(format!("Invalid data in {display}")))?;
    read_obo_str(&file_content.replace("\r\n", "\n"), ontology)
}

fn read_obo_str(file_content: &str, ontology: &mut Ontology) -> GoResult<()> {
    // stores tuples of Term - Parent
    let mut connections: Connections = Vec::new();

    for stanza in file_content.split("\n\n") {
        let stanza = stanza.trim_start_matches('\n');
        if let Some(term) = stanza.strip_prefix("[Term]\n") {
            if is_obsolete(term) {
                trace!("Skipping obsolete term: {term}");
                continue;
            }
            let raw_term = term_from_obo(term)?;
            let id = ontology.add_term(raw_term);
            add_connections(&mut connections, term, id)?;
        } else if stanza.starts_with("format-version") {
            if let Some(version) = stanza.lines().find_map(|line| line.strip_prefix("data-version: "))
            {
                ontology.set_version(version.trim());
            }
        } else {
            trace!("Ignoring: {stanza}");
        }
    }

    for (child, parent) in connections {
        if ontology.contains(parent) {
            ontology.add_parent(parent, child);
        } else {
            warn!("Parent {parent} of {child} is not part of the ontology");
        }
    }

    ontology.create_cache();
    Ok(())
}

fn is_obsolete(term: &str) -> bool {
    term.lines().any(|line| line == "is_obsolete: true")
}

fn term_from_obo(term: &str) -> GoResult<GoTermInternal> {
    let mut id: Option<&str> = None;
    let mut name: Option<&str> = None;
    let mut aspect: Option<Aspect> = None;
    for line in term.lines() {
        match line.split_once(": ") {
            Some(("id", value)) => id = Some(value),
            Some(("name", value)) => name = Some(value),
            Some(("namespace", value)) => aspect = Aspect::from_obo_namespace(value),
            _ => (),
        }
    }
    let (Some(id), Some(name)) = (id, name) else {
        return Err(GoError::InvalidInput(format!("Term without id or name: {term}")));
    };
    let mut raw_term = GoTermInternal::try_new(id, name)?;
    raw_term.set_aspect(aspect);
    Ok(raw_term)
}

fn add_connections(connections: &mut Connections, term: &str, id: GoTermId) -> GoResult<()> {
    for line in term.lines() {
        let value = if let Some(value) = line.strip_prefix("is_a: ") {
            value
        } else if let Some(value) = line.strip_prefix("relationship: part_of ") {
            value
        } else {
            continue;
        };
        let term_id = value.split_once(' ').map_or(value, |(term_id, _)| term_id);
        connections.push((id, GoTermId::try_from(term_id)?));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const OBO: &str = "format-version: 1.2
data-version: releases/2024-01-17
ontology: go

[Term]
id: GO:0008150
name: biological_process
namespace: biological_process

[Term]
id: GO:0009987
name: cellular process
namespace: biological_process
is_a: GO:0008150 ! biological_process

[Term]
id: GO:0044237
name: cellular metabolic process
namespace: biological_process
is_a: GO:0009987 ! cellular process
relationship: part_of GO:0008150 ! biological_process

[Term]
id: GO:0000001
name: mitochondrion inheritance
namespace: biological_process
is_obsolete: true

[Typedef]
id: part_of
name: part of
";

    #[test]
    fn split_terms() {
        let mut ont = Ontology::default();
        read_obo_str(OBO, &mut ont).unwrap();

        assert_eq!(ont.len(), 3);
        assert_eq!(ont.version(), "releases/2024-01-17");
        assert!(ont.term(1u32).is_none());

        let leaf = ont.term(44237u32).unwrap();
        assert_eq!(leaf.name(), "cellular metabolic process");
        assert_eq!(leaf.aspect(), Some(Aspect::BiologicalProcess));
        assert_eq!(leaf.parents().count(), 2);
        assert_eq!(leaf.all_parent_ids().len(), 2);

        assert_eq!(ont.term(8150u32).unwrap().children().count(), 2);
    }

    #[test]
    fn invalid_parent_id() {
        let mut ont = Ontology::default();
        let obo = "[Term]\nid: GO:0000002\nname: foo\nis_a: XX:1 ! bar\n";
        assert!(read_obo_str(obo, &mut ont).is_err());
    }

    #[test]
    fn missing_name() {
        assert!(term_from_obo("id: GO:0000002\nnamespace: biological_process").is_err());
    }
}
