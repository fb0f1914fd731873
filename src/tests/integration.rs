#[cfg(test)]
mod integration_tests {

    use crate::{DsvError, ErrorKind, NFC, NFD, Profile, ProfileError, Value};

    // Grouping profile in the shape the wordlist tooling produces: boundary
    // markers map to NULL, grouped sounds are joined by "_" in the key.
    const GROUPING_TSV: &str = "Grapheme\tGrouped\tPlain\tFrequency\n\
                                ^\tNULL\tNULL\t\n\
                                $\tNULL\tNULL\t\n\
                                _\tNULL\tNULL\t\n\
                                th_a\tth.a\tth a\t3\n\
                                k\tk\tk\t5\n\
                                a\ta\ta\t2\n\
                                ts_o\tts.o\tts o\t1\n";

    fn grouping_profile() -> Profile {
        Profile::builder()
            .normalization(NFC)
            .from_reader(GROUPING_TSV.as_bytes())
            .unwrap()
    }

    #[test]
    fn grouped_and_plain_columns() {
        let prf = grouping_profile();
        assert_eq!(prf.invoke("^k_th_a$", "Grouped").unwrap(), ["k", "th.a"]);
        assert_eq!(prf.invoke("^k_th_a$", "Plain").unwrap(), ["k", "th a"]);
        assert_eq!(prf.invoke("ts_o_a_k", "Grouped").unwrap(), ["ts.o", "a", "k"]);
    }

    #[test]
    fn unknown_material_is_marked_not_dropped() {
        let prf = grouping_profile();
        assert_eq!(
            prf.invoke("k_x_th_a", "Grouped").unwrap(),
            ["k", "«x»", "th.a"]
        );
        // "t" and "h" alone are unknown: "th_o" does not match "th_a".
        assert_eq!(
            prf.invoke("th_o", "Grouped").unwrap(),
            ["«t»", "«h»", "«o»"]
        );
    }

    #[test]
    fn frequency_column_reads_as_text() {
        let prf = grouping_profile();
        assert_eq!(prf.get("k").unwrap()["Frequency"], "5");
        assert_eq!(prf.invoke("k", "Frequency").unwrap(), ["5"]);
        assert_eq!(prf.invoke("^", "Frequency").unwrap(), [""]);
    }

    #[test]
    fn write_then_read_reproduces_profile() {
        let prf = grouping_profile();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grouping.tsv");
        prf.write(&path, b'\t').unwrap();

        let back = Profile::builder()
            .normalization(NFC)
            .from_file(&path)
            .unwrap();
        assert_eq!(back.columns(), prf.columns());
        assert_eq!(back.to_table(), prf.to_table());
        for input in ["^k_th_a$", "ts_o", "zz", ""] {
            assert_eq!(
                back.invoke(input, "Grouped").unwrap(),
                prf.invoke(input, "Grouped").unwrap()
            );
        }
    }

    #[test]
    fn fields_needing_quotes_survive_a_round_trip() {
        let prf = Profile::builder()
            .from_table([
                ["Grapheme", "Gloss"],
                [",", "comma, literally"],
                ["\"", "a \"quote\""],
            ])
            .unwrap();
        let mut out = Vec::new();
        prf.write_to(&mut out, b',').unwrap();
        let back = Profile::builder()
            .delimiter(b',')
            .from_reader(out.as_slice())
            .unwrap();
        assert_eq!(back.invoke(",\"", "Gloss").unwrap(), ["comma, literally", "a \"quote\""]);
    }

    #[test]
    fn empty_grapheme_survives_a_round_trip() {
        let prf = Profile::builder().from_table([["Grapheme"], [""]]).unwrap();
        let mut out = Vec::new();
        prf.write_to(&mut out, b'\t').unwrap();
        assert_eq!(out, b"Grapheme\n\"\"\n");

        let back = Profile::builder().from_reader(out.as_slice()).unwrap();
        assert_eq!(back.len(), 1);
        assert!(back.contains(""));
        assert_eq!(back.to_table(), prf.to_table());
    }

    #[test]
    fn default_normalization_is_decomposed() {
        let prf = Profile::builder()
            .from_table([["Grapheme", "IPA"], ["\u{00E3}", "\u{00E3}"]])
            .unwrap();
        assert_eq!(prf.options().normalization, NFD);
        assert_eq!(prf.graphemes().collect::<Vec<_>>(), ["a\u{0303}"]);
        // Composed and decomposed queries both hit the entry.
        assert_eq!(prf.invoke("\u{00E3}", "IPA").unwrap(), ["a\u{0303}"]);
        assert_eq!(prf.invoke("a\u{0303}", "IPA").unwrap(), ["a\u{0303}"]);
    }

    #[test]
    fn combining_marks_split_off_unknown_bases() {
        let prf = Profile::builder()
            .from_table([["Grapheme", "IPA"], ["t", "t"]])
            .unwrap();
        assert_eq!(prf.tokenize("t\u{00E3}").unwrap(), ["t", "«a»", "«\u{0303}»"]);
    }

    #[test]
    fn error_kinds() {
        let empty = Profile::builder().from_reader("Grapheme\tIPA\n".as_bytes());
        assert!(matches!(empty, Err(ProfileError::EmptyRecords)));

        let ragged = Profile::builder().from_reader("Grapheme\tIPA\na\tb\tc\n".as_bytes());
        assert_eq!(ragged.unwrap_err().kind(), ErrorKind::Configuration);

        let missing = Profile::builder().from_file("/nonexistent/profile.tsv");
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::Io);

        let multibyte_delimiter = Profile::builder()
            .delimiter(0xC3)
            .from_reader("Grapheme\tIPA\n\u{e3}\tx\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            multibyte_delimiter,
            ProfileError::Dsv(DsvError::Delimiter(0xC3))
        ));
        assert_eq!(multibyte_delimiter.kind(), ErrorKind::Configuration);

        let prf = grouping_profile();
        let mut sink: Vec<u8> = Vec::new();
        assert_eq!(
            prf.write_to(&mut sink, 0xE3).unwrap_err().kind(),
            ErrorKind::Configuration
        );
        assert!(sink.is_empty());
        assert_eq!(
            prf.invoke("k", "IPA").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(prf.get("zz").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn entries_iterate_in_file_order() {
        let prf = grouping_profile();
        let order: Vec<_> = prf.entries().map(|(g, _)| g).collect();
        assert_eq!(order, ["^", "$", "_", "th_a", "k", "a", "ts_o"]);
        let (_, first) = prf.entries().next().unwrap();
        assert_eq!(first.to_record()["Grouped"], Value::from("NULL"));
    }

    #[test]
    fn shared_profile_across_threads() {
        let prf = grouping_profile();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    assert_eq!(prf.invoke("^k_th_a$", "Grouped").unwrap(), ["k", "th.a"]);
                });
            }
        });
    }
}
