use glam::Vec2;
use platform_nav_core::{jump_frames, AgentConfig, Footprint, TileCoord, TileType};
use platform_nav_system_pathfinding::{PathFinder, PathRequest};
use platform_nav_world::GridMap;

fn map_with(tiles: &[(i32, i32, TileType)]) -> GridMap {
    let mut map = GridMap::new(20, Vec2::ZERO);
    for &(x, y, kind) in tiles {
        map.set_tile(TileCoord::new(x, y), kind);
    }
    map
}

fn blocks(columns: std::ops::RangeInclusive<i32>, rows: std::ops::RangeInclusive<i32>) -> Vec<(i32, i32, TileType)> {
    let mut tiles = Vec::new();
    for x in columns {
        for y in rows.clone() {
            tiles.push((x, y, TileType::Block));
        }
    }
    tiles
}

fn request(start: (i32, i32), goal: (i32, i32), max_jump_height: u32) -> PathRequest {
    let config = AgentConfig {
        max_jump_height,
        ..AgentConfig::default()
    };
    PathRequest::for_agent(
        TileCoord::new(start.0, start.1),
        TileCoord::new(goal.0, goal.1),
        &config,
    )
}

fn rises(path: &[TileCoord]) -> Vec<i32> {
    path.windows(2)
        .map(|pair| pair[1].y() - pair[0].y())
        .filter(|rise| *rise > 0)
        .collect()
}

#[test]
fn adjacent_goal_yields_single_step() {
    let map = map_with(&[]);
    let mut finder = PathFinder::new();

    let path = finder
        .find_path(&map, &request((5, 2), (6, 2), 5))
        .expect("adjacent goal is reachable");

    assert_eq!(path, vec![TileCoord::new(5, 2), TileCoord::new(6, 2)]);
    assert_eq!(jump_frames(path[1].y() - path[0].y()), 0);
}

#[test]
fn start_equal_to_goal_yields_only_the_start() {
    let map = map_with(&[]);
    let path = PathFinder::new().find_path(&map, &request((7, 2), (7, 2), 5));
    assert_eq!(path, Some(vec![TileCoord::new(7, 2)]));
}

#[test]
fn identical_searches_return_identical_paths() {
    let mut tiles = blocks(6..=6, 2..=4);
    tiles.extend(blocks(11..=13, 6..=6));
    tiles.push((9, 8, TileType::OneWay));
    let map = map_with(&tiles);
    let request = request((3, 2), (12, 7), 5);

    let mut reused = PathFinder::new();
    let first = reused.find_path(&map, &request);
    let second = reused.find_path(&map, &request);
    let fresh = PathFinder::new().find_path(&map, &request);

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(first, fresh);
}

#[test]
fn consecutive_waypoints_always_differ() {
    let map = map_with(&blocks(9..=9, 2..=3));
    let path = PathFinder::new()
        .find_path(&map, &request((4, 2), (14, 2), 5))
        .expect("low step is climbable");

    assert!(path.windows(2).all(|pair| pair[0] != pair[1]));
    assert_eq!(path.first(), Some(&TileCoord::new(4, 2)));
    assert_eq!(path.last(), Some(&TileCoord::new(14, 2)));
}

#[test]
fn sheer_wall_is_refused_in_favour_of_staircase() {
    let mut tiles = blocks(8..=9, 2..=7);
    tiles.extend(blocks(10..=11, 2..=4));
    let map = map_with(&tiles);

    let path = PathFinder::new()
        .find_path(&map, &request((15, 2), (8, 8), 3))
        .expect("staircase reaches the top of the wall");

    assert_eq!(path.last(), Some(&TileCoord::new(8, 8)));
    assert!(rises(&path).iter().all(|rise| *rise <= 3));
    assert!(path
        .iter()
        .any(|tile| tile.y() == 5 && (10..=11).contains(&tile.x())));
}

#[test]
fn rise_beyond_jump_limit_is_unreachable() {
    let map = map_with(&blocks(8..=9, 2..=7));
    let mut finder = PathFinder::new();

    assert_eq!(finder.find_path(&map, &request((15, 2), (8, 8), 5)), None);

    let path = finder
        .find_path(&map, &request((15, 2), (8, 8), 6))
        .expect("a six tile jump clears the wall");
    assert_eq!(rises(&path), vec![6]);
}

#[test]
fn exhausted_budget_reports_no_path() {
    let map = map_with(&[]);
    let request = request((3, 2), (16, 2), 5);

    assert_eq!(PathFinder::with_search_limit(3).find_path(&map, &request), None);
    assert!(PathFinder::new().find_path(&map, &request).is_some());
}

#[test]
fn blocked_or_floating_goals_are_unreachable() {
    let map = map_with(&blocks(8..=8, 2..=2));
    let mut finder = PathFinder::new();

    assert_eq!(finder.find_path(&map, &request((4, 2), (8, 2), 5)), None);
    assert_eq!(finder.find_path(&map, &request((4, 2), (8, 15), 5)), None);
}

#[test]
fn tall_footprint_climbs_over_low_ceiling() {
    let map = map_with(&blocks(8..=10, 3..=3));
    let mut finder = PathFinder::new();

    let short = finder
        .find_path(&map, &request((4, 2), (12, 2), 5))
        .expect("single tile agent walks underneath");
    assert!(short.iter().all(|tile| tile.y() == 2));

    let mut tall = request((4, 2), (12, 2), 5);
    tall.footprint = Footprint::new(1, 2);
    let over = finder
        .find_path(&map, &tall)
        .expect("tall agent climbs over the ceiling");
    assert!(over.iter().any(|tile| tile.y() >= 4));
    assert!(over
        .iter()
        .all(|tile| map.fits(*tile, Footprint::new(1, 2))));
}

#[test]
fn one_way_platform_can_be_jumped_through_from_below() {
    let tiles: Vec<_> = (6..=10).map(|x| (x, 5, TileType::OneWay)).collect();
    let map = map_with(&tiles);

    let path = PathFinder::new()
        .find_path(&map, &request((3, 2), (8, 6), 5))
        .expect("platform top is reachable");

    assert_eq!(path.last(), Some(&TileCoord::new(8, 6)));
    assert_eq!(rises(&path), vec![4]);
}

#[test]
fn ignoring_one_way_platforms_allows_dropping_through() {
    let tiles: Vec<_> = (6..=10).map(|x| (x, 5, TileType::OneWay)).collect();
    let map = map_with(&tiles);

    let mut through = request((8, 6), (8, 2), 5);
    through.ignores_one_way = true;
    let dropped = PathFinder::new()
        .find_path(&map, &through)
        .expect("agent drops through the platform");
    assert_eq!(dropped, vec![TileCoord::new(8, 6), TileCoord::new(8, 2)]);

    let around = PathFinder::new()
        .find_path(&map, &request((8, 6), (8, 2), 5))
        .expect("agent walks off the platform edge");
    assert!(around.len() > 2);
    assert!(around.iter().any(|tile| tile.x() < 6 || tile.x() > 10));
}

#[test]
fn every_segment_is_horizontal_or_vertical() {
    let mut staircase = blocks(8..=9, 2..=7);
    staircase.extend(blocks(10..=11, 2..=4));
    let platforms: Vec<_> = (6..=10).map(|x| (x, 5, TileType::OneWay)).collect();
    let cases = [
        (map_with(&blocks(10..=10, 2..=4)), request((5, 2), (15, 2), 5)),
        (map_with(&staircase), request((15, 2), (8, 8), 3)),
        (map_with(&staircase), request((8, 8), (15, 2), 3)),
        (map_with(&platforms), request((8, 6), (8, 2), 5)),
        (map_with(&[]), request((5, 9), (9, 2), 5)),
    ];

    for (map, request) in &cases {
        let path = PathFinder::new()
            .find_path(map, request)
            .expect("route exists");
        for pair in path.windows(2) {
            assert!(
                pair[0].x() == pair[1].x() || pair[0].y() == pair[1].y(),
                "diagonal segment {:?} -> {:?}",
                pair[0],
                pair[1]
            );
            assert!(map.fits(pair[1], request.footprint));
        }
    }
}

#[test]
fn stepping_off_a_ledge_passes_the_column_beside_it() {
    let map = map_with(&blocks(10..=10, 2..=4));
    let path = PathFinder::new()
        .find_path(&map, &request((10, 5), (13, 2), 5))
        .expect("agent steps off the column");

    assert_eq!(
        &path[..3],
        &[
            TileCoord::new(10, 5),
            TileCoord::new(11, 5),
            TileCoord::new(11, 2)
        ]
    );
    assert_eq!(path.last(), Some(&TileCoord::new(13, 2)));
}
