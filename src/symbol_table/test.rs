use super::*;

fn class_table() -> SymbolTable {
    let mut table = SymbolTable::new();
    table.define("count", "int", Kind::Static).unwrap();
    table.define("x", "int", Kind::Field).unwrap();
    table.define("y", "int", Kind::Field).unwrap();
    table.define("next", "Node", Kind::Field).unwrap();
    table
}

#[test]
fn test_indices_are_dense_per_kind() {
    let mut table = class_table();
    table.define("this", "Node", Kind::Argument).unwrap();
    table.define("a", "int", Kind::Argument).unwrap();
    table.define("i", "int", Kind::Local).unwrap();
    table.define("j", "boolean", Kind::Local).unwrap();
    table.define("k", "char", Kind::Local).unwrap();

    for kind in Kind::ALL {
        let mut indices: Vec<u16> = table.symbols(kind).map(|s| s.index).collect();
        indices.sort();
        let expected: Vec<u16> = (0..table.var_count(kind)).collect();
        assert_eq!(indices, expected, "{kind} indices are not 0..n");
    }

    assert_eq!(table.var_count(Kind::Static), 1);
    assert_eq!(table.var_count(Kind::Field), 3);
    assert_eq!(table.var_count(Kind::Argument), 2);
    assert_eq!(table.var_count(Kind::Local), 3);
    assert_eq!(table.index_of("next"), Ok(2));
    assert_eq!(table.index_of("k"), Ok(2));
    assert_eq!(table.type_of("j"), Ok("boolean"));
}

#[test]
fn test_duplicate_in_same_scope() {
    let mut table = class_table();
    let err = table.define("x", "char", Kind::Static).unwrap_err();
    assert_eq!(
        err,
        SymbolError::DuplicateSymbol {
            name: "x".to_string(),
            kind: Kind::Field,
        }
    );
    // a failed define does not consume an index
    assert_eq!(table.var_count(Kind::Static), 1);

    table.define("a", "int", Kind::Argument).unwrap();
    assert!(matches!(
        table.define("a", "int", Kind::Local),
        Err(SymbolError::DuplicateSymbol { .. })
    ));
}

#[test]
fn test_local_silently_shadows_field() {
    let mut table = class_table();
    table.define("x", "boolean", Kind::Local).unwrap();

    assert_eq!(table.kind_of("x"), Some(Kind::Local));
    assert_eq!(table.type_of("x"), Ok("boolean"));
    assert_eq!(table.index_of("x"), Ok(0));

    table.reset_subroutine_scope();
    assert_eq!(table.kind_of("x"), Some(Kind::Field));
    assert_eq!(table.index_of("x"), Ok(0));
}

#[test]
fn test_reset_drops_subroutine_entries() {
    let mut table = class_table();
    table.define("tmp", "int", Kind::Local).unwrap();
    table.define("arg", "int", Kind::Argument).unwrap();

    table.reset_subroutine_scope();

    assert_eq!(table.kind_of("tmp"), None);
    assert_eq!(table.kind_of("arg"), None);
    assert_eq!(table.var_count(Kind::Argument), 0);
    assert_eq!(table.var_count(Kind::Local), 0);
    assert_eq!(table.var_count(Kind::Field), 3);
    assert_eq!(table.var_count(Kind::Static), 1);

    assert_eq!(table.define("tmp", "char", Kind::Local).unwrap().index, 0);
}

#[test]
fn test_unresolved_lookups() {
    let table = class_table();
    assert_eq!(table.kind_of("missing"), None);
    assert_eq!(
        table.type_of("missing"),
        Err(SymbolError::UnresolvedSymbol("missing".to_string()))
    );
    assert_eq!(
        table.index_of("missing"),
        Err(SymbolError::UnresolvedSymbol("missing".to_string()))
    );
}

#[test]
fn test_kind_from_keyword() {
    assert_eq!(Kind::try_from(Keyword::Static), Ok(Kind::Static));
    assert_eq!(Kind::try_from(Keyword::Field), Ok(Kind::Field));
    assert_eq!(Kind::try_from(Keyword::Var), Ok(Kind::Local));
    assert_eq!(
        Kind::try_from(Keyword::While),
        Err(SymbolError::InvalidKind("while".to_string()))
    );
}
