//! Integration tests for CSV roster import.

use bracket_engine::roster::read_teams;
use bracket_engine::BracketError;
use uuid::Uuid;

#[test]
fn parses_teams_with_optional_columns() {
    let csv = "\
name,rating,region,seed
Falcons, 1820.5 ,EU,2
Sentinels,1790,,
Paper Rex,1750,APAC,1
";
    let teams = read_teams(csv.as_bytes()).unwrap();
    assert_eq!(teams.len(), 3);

    assert_eq!(teams[0].name, "Falcons");
    assert_eq!(teams[0].rating, 1820.5);
    assert_eq!(teams[0].region, "EU");
    assert_eq!(teams[0].seed, Some(2));

    assert_eq!(teams[1].region, "Unknown");
    assert_eq!(teams[1].seed, None);

    assert_eq!(teams[2].seed, Some(1));
    assert_ne!(teams[0].id, teams[2].id);
}

#[test]
fn keeps_ids_when_given() {
    let id = Uuid::new_v4();
    let csv = format!("id,name,rating,region,seed\n{id},Fnatic,1700,EU,\n");
    let teams = read_teams(csv.as_bytes()).unwrap();
    assert_eq!(teams[0].id, id);
}

#[test]
fn rejects_duplicate_names_ignoring_case() {
    let csv = "name,rating,region,seed\nLOUD,1600,SA,\nloud,1500,SA,\n";
    let err = read_teams(csv.as_bytes()).unwrap_err();
    assert_eq!(err, BracketError::Roster("duplicate team name: loud".to_string()));
}

#[test]
fn rejects_bad_rows() {
    let bad_rating = "name,rating,region,seed\nNRG,strong,NA,\n";
    assert!(matches!(
        read_teams(bad_rating.as_bytes()),
        Err(BracketError::Roster(msg)) if msg.starts_with("row 1")
    ));

    let empty_name = "name,rating,region,seed\n ,1500,NA,\n";
    assert_eq!(
        read_teams(empty_name.as_bytes()).unwrap_err(),
        BracketError::Roster("row 1: empty team name".to_string())
    );
}

#[test]
fn empty_roster_is_empty() {
    let teams = read_teams("name,rating,region,seed\n".as_bytes()).unwrap();
    assert!(teams.is_empty());
}
