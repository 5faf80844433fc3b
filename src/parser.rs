//! Parsing the GO master data provided by the GO Consortium and NCBI

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::{GoError, GoResult};

/// Module to parse `go-basic.obo` file
pub(crate) mod go_obo;

/// Opens a reference data file for buffered reading
///
/// Files ending in `.gz` are decompressed on the fly.
pub(crate) fn open_reader<P: AsRef<Path>>(path: P) -> GoResult<Box<dyn BufRead>> {
    let path = path.as_ref();
    let filename = path.display().to_string();
    let file = File::open(path).map_err(|_| GoError::CannotOpenFile(filename))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Module to parse GO - `Gene` associations from the NCBI `gene2go` file
///
/// # Example lines
///
/// ```text
/// #tax_id GeneID  GO_ID       Evidence Qualifier     GO_term                  PubMed  Category
/// 9606    1       GO:0003674  ND       enables       molecular_function       -       Function
/// 9606    2       GO:0002576  TAS      involved_in   platelet degranulation   -       Process
/// ```
pub mod gene2go {
    use std::io::BufRead;
    use std::path::Path;

    use tracing::{debug, warn};

    use crate::{GoError, GoResult, GoTermId, Ontology};

    struct Annotation<'a> {
        tax_id: u32,
        gene_id: &'a str,
        go_id: GoTermId,
        negated: bool,
    }

    fn parse_line(line: &str) -> GoResult<Option<Annotation<'_>>> {
        if line.starts_with('#') || line.trim().is_empty() {
            return Ok(None);
        }
        let mut cols = line.split('\t');

        let Some(tax_id) = cols.next() else {
            return Err(GoError::InvalidInput(line.to_string()));
        };
        let Some(gene_id) = cols.next() else {
            return Err(GoError::InvalidInput(line.to_string()));
        };
        let Some(go_id) = cols.next() else {
            return Err(GoError::InvalidInput(line.to_string()));
        };
        // Column 4 is the evidence code
        if cols.next().is_none() {
            return Err(GoError::InvalidInput(line.to_string()));
        }
        let Some(qualifier) = cols.next() else {
            return Err(GoError::InvalidInput(line.to_string()));
        };

        Ok(Some(Annotation {
            tax_id: tax_id.trim().parse()?,
            gene_id,
            go_id: GoTermId::try_from(go_id)?,
            negated: qualifier.starts_with("NOT"),
        }))
    }

    /// Parses `gene2go` and links every gene of `taxon` to its GO terms
    ///
    /// Negated annotations (`NOT ...` qualifiers) are ignored, so are
    /// annotations to terms that are missing in the ontology, e.g.
    /// because they are obsolete.
    ///
    /// # Errors
    ///
    /// - [`GoError::CannotOpenFile`]: Source file not present or can't be opened
    /// - [`GoError::InvalidInput`]: A line does not contain enough columns
    /// - [`GoError::ParseIntError`]: A line contains an invalid taxon or gene ID
    pub fn parse<P: AsRef<Path>>(file: P, taxon: u32, ontology: &mut Ontology) -> GoResult<()> {
        let reader = super::open_reader(file)?;
        let mut skipped = 0usize;
        for line in reader.lines() {
            let line =
                line.map_err(|_| GoError::InvalidInput("Invalid data in gene2go".to_string()))?;
            let Some(annotation) = parse_line(&line)? else {
                continue;
            };
            if annotation.tax_id != taxon || annotation.negated {
                continue;
            }
            if !ontology.contains(annotation.go_id) {
                skipped += 1;
                continue;
            }
            let gene_id = ontology.add_gene(annotation.gene_id)?;
            ontology.link_gene_term(annotation.go_id, gene_id)?;
        }
        if skipped > 0 {
            warn!("Skipped {skipped} annotations to terms missing from the ontology");
        }
        debug!("Parsed gene2go for taxon {taxon}");
        Ok(())
    }

    #[cfg(test)]
    mod test_gene2go_parsing {
        use super::*;

        #[test]
        fn test_skip_comment() {
            let line = "#tax_id\tGeneID\tGO_ID\tEvidence\tQualifier\tGO_term\tPubMed\tCategory";
            assert!(parse_line(line).unwrap().is_none());
        }

        #[test]
        fn test_correct_line() {
            let line = "9606\t2\tGO:0002576\tTAS\tinvolved_in\tplatelet degranulation\t-\tProcess";
            let res = parse_line(line).unwrap().unwrap();
            assert_eq!(res.tax_id, 9606);
            assert_eq!(res.gene_id, "2");
            assert_eq!(res.go_id.as_u32(), 2576);
            assert!(!res.negated);
        }

        #[test]
        fn test_negated_line() {
            let line = "9606\t2\tGO:0002576\tIBA\tNOT involved_in\tplatelet degranulation\t-\tProcess";
            assert!(parse_line(line).unwrap().unwrap().negated);
        }

        #[test]
        fn test_missing_columns() {
            assert!(parse_line("9606\t2\tGO:0002576").is_err());
        }

        #[test]
        fn test_invalid_go_id() {
            let line = "9606\t2\tHP:0002576\tTAS\tinvolved_in\tfoo\t-\tProcess";
            assert!(parse_line(line).is_err());
        }

        #[test]
        fn test_parse_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("gene2go");
            std::fs::write(
                &path,
                "#tax_id\tGeneID\tGO_ID\tEvidence\tQualifier\tGO_term\tPubMed\tCategory\n\
                9606\t1\tGO:0006915\tTAS\tinvolved_in\tapoptotic process\t-\tProcess\n\
                9606\t2\tGO:0006915\tIBA\tNOT involved_in\tapoptotic process\t-\tProcess\n\
                9606\t3\tGO:0000001\tTAS\tinvolved_in\tobsolete\t-\tProcess\n\
                10090\t4\tGO:0006915\tTAS\tinvolved_in\tapoptotic process\t-\tProcess\n",
            )
            .unwrap();

            let mut ont = Ontology::default();
            ont.insert_term("apoptotic process".to_string(), 6915u32);
            parse(&path, 9606, &mut ont).unwrap();

            let term = ont.term(6915u32).unwrap();
            assert_eq!(term.gene_ids().len(), 1);
            assert_eq!(ont.genes().count(), 1);
        }
    }
}

/// Module to parse Entrez - Ensembl cross references from the NCBI `gene2ensembl` file
///
/// # Example lines
///
/// ```text
/// #tax_id GeneID  Ensembl_gene_identifier RNA_nucleotide_accession.version    Ensembl_rna_identifier  ...
/// 9606    7157    ENSG00000141510         NM_000546.6                         ENST00000269305.9       ...
/// ```
pub mod gene2ensembl {
    use std::collections::HashSet;
    use std::io::BufRead;
    use std::path::Path;

    use crate::{GoError, GoResult};

    fn parse_line(line: &str) -> GoResult<Option<(u32, &str, &str)>> {
        if line.starts_with('#') || line.trim().is_empty() {
            return Ok(None);
        }
        let mut cols = line.split('\t');
        let (Some(tax_id), Some(gene_id), Some(ensembl)) = (cols.next(), cols.next(), cols.next())
        else {
            return Err(GoError::InvalidInput(line.to_string()));
        };
        Ok(Some((tax_id.trim().parse()?, gene_id, ensembl)))
    }

    /// Returns unique `(Ensembl gene, Entrez gene)` pairs of `taxon`
    ///
    /// The file contains one line per transcript, so genes are repeated.
    /// The order of the first occurrence is kept.
    ///
    /// # Errors
    ///
    /// - [`GoError::CannotOpenFile`]: Source file not present or can't be opened
    /// - [`GoError::InvalidInput`]: A line does not contain enough columns
    pub fn parse<P: AsRef<Path>>(file: P, taxon: u32) -> GoResult<Vec<(String, String)>> {
        let reader = super::open_reader(file)?;
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for line in reader.lines() {
            let line = line
                .map_err(|_| GoError::InvalidInput("Invalid data in gene2ensembl".to_string()))?;
            let Some((tax_id, gene_id, ensembl)) = parse_line(&line)? else {
                continue;
            };
            if tax_id != taxon || ensembl == "-" {
                continue;
            }
            let pair = (ensembl.to_string(), gene_id.to_string());
            if seen.insert(pair.clone()) {
                pairs.push(pair);
            }
        }
        Ok(pairs)
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn correct_line() {
            let line = "9606\t7157\tENSG00000141510\tNM_000546.6\tENST00000269305.9";
            assert_eq!(
                parse_line(line).unwrap(),
                Some((9606, "7157", "ENSG00000141510"))
            );
        }

        #[test]
        fn short_line() {
            assert!(parse_line("9606\t7157").is_err());
            assert!(parse_line("#tax_id\tGeneID").unwrap().is_none());
        }

        #[test]
        fn gzipped_file() {
            use flate2::write::GzEncoder;
            use flate2::Compression;
            use std::io::Write;

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("gene2ensembl.gz");
            let file = std::fs::File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder
                .write_all(
                    b"#tax_id\tGeneID\tEnsembl_gene_identifier\n\
                    9606\t7157\tENSG00000141510\tNM_000546.6\n\
                    9606\t7157\tENSG00000141510\tNM_001126112.3\n\
                    9606\t672\t-\tNM_007294.4\n\
                    10090\t22059\tENSMUSG00000059552\tNM_011640.3\n",
                )
                .unwrap();
            encoder.finish().unwrap();

            let pairs = parse(&path, 9606).unwrap();
            assert_eq!(pairs, [("ENSG00000141510".to_string(), "7157".to_string())]);
        }
    }
}
