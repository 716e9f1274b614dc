//! Average traversal speed of road edges, in km/h, broken down by
//! weekday and hour.  Joins a stream of timed edge traversals with a
//! stream of edge geometries.

use anyhow::Result;
use rowflow::*;

fn edge_speed_graph() -> Graph {
    let traversals = Graph::from_iter("travel_times")
        .map(ParseDatetime::new("enter_time", "enter_dt"))
        .map(ParseDatetime::new("leave_time", "leave_dt"))
        .map(WeekdayHour::new("enter_dt", "weekday", "hour"))
        .map(DurationHours::new("enter_dt", "leave_dt", "duration"))
        .map(Project::new(&["edge_id", "weekday", "hour", "duration"]))
        .sort(&["edge_id"]);

    let lengths = Graph::from_iter("edge_lengths")
        .map(Arithmetic::new(
            |args| {
                let start = args[0].as_point().unwrap();
                let end = args[1].as_point().unwrap();
                Ok(Value::Float(haversine_distance(start, end)))
            },
            &["start", "end"],
            "distance",
        ))
        .map(Project::new(&["edge_id", "distance"]))
        .sort(&["edge_id"]);

    let joined = traversals
        .join(InnerJoiner::new(), &lengths, &["edge_id"])
        .sort(&["weekday", "hour"]);

    let hours = joined.reduce(Sum::new("duration"), &["weekday", "hour"]);
    let kilometers = joined.reduce(Sum::new("distance"), &["weekday", "hour"]);

    kilometers
        .join(InnerJoiner::new(), &hours, &["weekday", "hour"])
        .map(Arithmetic::new(
            |args| {
                let distance = args[0].as_f64().unwrap();
                let duration = args[1].as_f64().unwrap();
                Ok(Value::Float(distance / duration))
            },
            &["distance", "duration"],
            "speed",
        ))
        .map(Project::new(&["weekday", "hour", "speed"]))
}

fn main() -> Result<()> {
    env_logger::init();
    let inputs = Inputs::new()
        .rows(
            "travel_times",
            vec![
                row! {
                    "edge_id": 8414926848168493057_i64,
                    "enter_time": "20170912T123410.1794",
                    "leave_time": "20170912T123412.68",
                },
                row! {
                    "edge_id": 8414926848168493057_i64,
                    "enter_time": "20170912T143637.654",
                    "leave_time": "20170912T143640.3535",
                },
                row! {
                    "edge_id": 5342768494149337085_i64,
                    "enter_time": "20170916T082917.37",
                    "leave_time": "20170916T082919.51",
                },
            ],
        )
        .rows(
            "edge_lengths",
            vec![
                row! {
                    "edge_id": 8414926848168493057_i64,
                    "start": (37.8494, 55.7354),
                    "end": (37.8496, 55.7355),
                },
                row! {
                    "edge_id": 5342768494149337085_i64,
                    "start": (37.5902, 55.7108),
                    "end": (37.5907, 55.7110),
                },
            ],
        );
    for row in edge_speed_graph().run(&inputs)? {
        println!("{}", row?);
    }
    Ok(())
}
