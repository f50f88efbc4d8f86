use lammps2trr::{ColumnSchema, Error, Field, MatchPolicy};

fn columns(schema: &ColumnSchema) -> [usize; 6] {
    Field::ALL.map(|field| schema.column(field))
}

mod exact {
    use super::*;

    #[test]
    fn canonical_order() -> lammps2trr::Result<()> {
        let schema = ColumnSchema::from_header("ITEM: ATOMS xu yu zu vx vy vz", MatchPolicy::Exact)?;
        assert_eq!(columns(&schema), [0, 1, 2, 3, 4, 5]);
        Ok(())
    }

    #[test]
    fn names_only() -> lammps2trr::Result<()> {
        let names = ["xu", "yu", "zu", "vx", "vy", "vz"];
        let schema = ColumnSchema::from_names(&names, MatchPolicy::Exact)?;
        assert_eq!(columns(&schema), [0, 1, 2, 3, 4, 5]);
        Ok(())
    }

    #[test]
    fn with_id_and_type() -> lammps2trr::Result<()> {
        let schema = ColumnSchema::from_header(
            "ITEM: ATOMS id type xu yu zu vx vy vz",
            MatchPolicy::Exact,
        )?;
        assert_eq!(columns(&schema), [2, 3, 4, 5, 6, 7]);
        assert_eq!(schema.width(), 8);
        Ok(())
    }

    #[test]
    fn shuffled() -> lammps2trr::Result<()> {
        let schema = ColumnSchema::from_header(
            "ITEM: ATOMS id type vz vy vx mass zu yu xu",
            MatchPolicy::Exact,
        )?;
        assert_eq!(columns(&schema), [8, 7, 6, 4, 3, 2]);
        Ok(())
    }

    #[test]
    fn unwrapped_preferred() -> lammps2trr::Result<()> {
        let schema = ColumnSchema::from_header(
            "ITEM: ATOMS id x y z xu yu zu vx vy vz",
            MatchPolicy::Exact,
        )?;
        assert_eq!(columns(&schema), [4, 5, 6, 7, 8, 9]);
        Ok(())
    }

    #[test]
    fn wrapped_fallback() -> lammps2trr::Result<()> {
        let schema = ColumnSchema::from_header("ITEM: ATOMS id x y z vx vy vz", MatchPolicy::Exact)?;
        assert_eq!(columns(&schema), [1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn similar_names_ignored() -> lammps2trr::Result<()> {
        let schema = ColumnSchema::from_header(
            "ITEM: ATOMS xu yu zu vx vy vz xu_avg vxx",
            MatchPolicy::Exact,
        )?;
        assert_eq!(columns(&schema), [0, 1, 2, 3, 4, 5]);
        Ok(())
    }

    #[test]
    fn missing() {
        let result = ColumnSchema::from_header("ITEM: ATOMS id type xu yu zu vx vy", MatchPolicy::Exact);
        assert!(matches!(result, Err(Error::MissingColumn(Field::VelZ))));
    }

    #[test]
    fn ambiguous() {
        let result = ColumnSchema::from_header(
            "ITEM: ATOMS xu yu zu vx vy vz vx",
            MatchPolicy::Exact,
        );
        match result {
            Err(Error::AmbiguousColumn { field, name }) => {
                assert_eq!(field, Field::VelX);
                assert_eq!(name, "vx");
            }
            other => panic!("expected an ambiguous column, found {other:?}"),
        }
    }
}

mod prefix {
    use super::*;

    #[test]
    fn canonical_order() -> lammps2trr::Result<()> {
        let schema = ColumnSchema::from_header(
            "ITEM: ATOMS id type xu yu zu vx vy vz",
            MatchPolicy::Prefix,
        )?;
        assert_eq!(columns(&schema), [2, 3, 4, 5, 6, 7]);
        Ok(())
    }

    #[test]
    fn last_match_wins() -> lammps2trr::Result<()> {
        let schema = ColumnSchema::from_header(
            "ITEM: ATOMS xu yu zu vx vy vz xu_avg vxx",
            MatchPolicy::Prefix,
        )?;
        assert_eq!(columns(&schema), [6, 1, 2, 7, 4, 5]);
        Ok(())
    }

    #[test]
    fn wrapped_not_matched() {
        let result = ColumnSchema::from_header("ITEM: ATOMS id x y z vx vy vz", MatchPolicy::Prefix);
        assert!(matches!(result, Err(Error::MissingColumn(Field::PosX))));
    }
}

mod extract {
    use super::*;

    fn schema() -> ColumnSchema {
        ColumnSchema::from_header("ITEM: ATOMS id type xu yu zu vx vy vz", MatchPolicy::Exact)
            .unwrap()
    }

    #[test]
    fn values() {
        let values = schema().extract("1 1 1.0 2.0 3.0 0.1 0.2 0.3").unwrap();
        assert_eq!(values, [1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn trailing_columns() {
        let values = schema().extract("1 1 1.0 2.0 3.0 0.1 0.2 0.3 15.999 -1").unwrap();
        assert_eq!(values, [1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn too_short() {
        let reason = schema().extract("1 1 1.0 2.0 3.0 0.1 0.2").unwrap_err();
        assert!(reason.contains("7 columns"), "{reason}");
    }

    #[test]
    fn not_a_number() {
        let reason = schema().extract("1 1 1.0 2.0 nan? 0.1 0.2 0.3").unwrap_err();
        assert!(reason.contains("zu"), "{reason}");
    }
}
