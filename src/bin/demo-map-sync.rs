/// Demo: drive the filter/sync engine offline with scripted wire payloads.
/// Covers the whole flow: decode → classify → filter → marker reconciliation,
/// plus the popup lifecycle and the stale-fetch guard.
use petmap::app::session::MapSession;
use petmap::domain::{CanonicalCategory, FacilityDetail};
use petmap::infra::console_map::ConsoleMap;
use petmap::infra::wire;
use petmap::logging;
use petmap::metrics::{init_metrics, render_metrics};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();
    init_metrics();

    println!("\n🗺️  MAP SYNC DEMO: district load, filters, popups, races");
    println!("{}", "=".repeat(60));

    let mut map = ConsoleMap::new();
    let mut session = MapSession::new();

    // ================================================================================
    // STEP 1: DECODE - wire rows into classified facilities
    // ================================================================================
    println!("\n📄 STEP 1: DECODE - Reading a scripted facility payload...");

    let payload = json!([
        {
            "id": "koah:fac/101", "name": "강남 24시 동물병원",
            "category": "koah:VeterinaryHospital",
            "lat": 37.5172, "lng": 127.0473,
            "address": "서울 강남구 테헤란로 1", "tel": "02-555-0101"
        },
        {
            "id": "koah:fac/102", "name": "멍멍약국",
            "category": "기타",
            "lat": 37.5180, "lng": 127.0450
        },
        {
            "id": "koah:fac/103", "name": "고양이카페 모모",
            "category": "",
            "lat": 37.5195, "lng": 127.0502,
            "desc": "고양이 열두 마리가 상주하는 카페"
        },
        {
            // duplicate id: collapses to one marker, first row wins
            "id": "koah:fac/101", "name": "강남 24시 동물병원 (중복)",
            "category": "koah:VeterinaryHospital",
            "lat": 37.5172, "lng": 127.0473
        },
        {
            // malformed row: no coordinates, dropped with a warning
            "id": "koah:fac/104", "name": "좌표 없는 시설"
        },
        {
            // nothing to classify against
            "id": "koah:fac/105", "name": "이름만 있는 곳",
            "category": "koah:Unknown",
            "lat": 37.5200, "lng": 127.0400
        }
    ]);

    let (facilities, dropped) = wire::decode_facilities(&payload)?;
    println!("   ✅ Decoded {} facilities ({} rows dropped)", facilities.len(), dropped);
    for facility in &facilities {
        let label = facility.category.map(|c| c.label()).unwrap_or("미분류");
        println!("      - [{}] {}", label, facility.name);
    }

    // ================================================================================
    // STEP 2: LOAD - district change plus fetch completion
    // ================================================================================
    println!("\n📥 STEP 2: LOAD - Selecting 강남구 and applying the fetch...");

    let ticket = session.change_district("강남구", &mut map);
    session.complete_fetch(&ticket, Ok(facilities), &mut map);
    println!(
        "   ✅ {} visible, {} markers (duplicate id collapsed)",
        session.visible().len(),
        session.marker_count()
    );

    // ================================================================================
    // STEP 3: FILTER - toggle a category on and off
    // ================================================================================
    println!("\n🔍 STEP 3: FILTER - Hospitals only...");

    session.toggle_category(CanonicalCategory::Hospital, &mut map);
    println!("   ✅ {} visible with the hospital filter", session.visible().len());

    session.toggle_category(CanonicalCategory::Cafe, &mut map);
    println!("   ✅ {} visible with hospital + cafe", session.visible().len());

    session.reset_filters(&mut map);
    println!("   ✅ {} visible after reset", session.visible().len());

    // ================================================================================
    // STEP 4: POPUP - select, enrich with detail, filter away
    // ================================================================================
    println!("\n💬 STEP 4: POPUP - Detail lifecycle...");

    session.select_detail("koah:fac/101", &mut map);
    println!("   ✅ Popup open for {:?}", session.popup_facility_id());

    let detail = FacilityDetail {
        opening_hours: Some("09:00-22:00".to_string()),
        ..Default::default()
    };
    session.merge_detail("koah:fac/101", &detail, &mut map);
    println!("   ✅ Detail merged, popup refreshed");

    // the open popup belongs to a hospital; a cafe-only filter closes it
    session.toggle_category(CanonicalCategory::Cafe, &mut map);
    println!(
        "   ✅ Cafe-only filter closed the popup: open = {:?}",
        session.popup_facility_id()
    );
    session.reset_filters(&mut map);

    // ================================================================================
    // STEP 5: RACE - a slow fetch for a district the user already left
    // ================================================================================
    println!("\n🏁 STEP 5: RACE - Two district switches, slow response first...");

    let seocho_ticket = session.change_district("서초구", &mut map);
    let mapo_ticket = session.change_district("마포구", &mut map);

    let seocho = wire::decode_facilities(&json!([
        {"id": "koah:fac/201", "name": "서초 동물병원", "category": "koah:VeterinaryHospital",
         "lat": 37.4837, "lng": 127.0324}
    ]))?
    .0;
    let mapo = wire::decode_facilities(&json!([
        {"id": "koah:fac/301", "name": "마포 애견미용", "category": "koah:BeautySalon",
         "lat": 37.5663, "lng": 126.9019}
    ]))?
    .0;

    let applied = session.complete_fetch(&seocho_ticket, Ok(seocho), &mut map);
    println!("   ✅ Late 서초구 response applied: {}", applied);
    let applied = session.complete_fetch(&mapo_ticket, Ok(mapo), &mut map);
    println!("   ✅ Current 마포구 response applied: {}", applied);
    println!(
        "   📍 Showing {} in {}",
        session.visible().len(),
        session.district().unwrap_or("-")
    );

    // ================================================================================
    // FINAL: metrics the run produced
    // ================================================================================
    if let Some(rendered) = render_metrics() {
        println!("\n📊 FINAL: Metrics snapshot");
        println!("{}", "=".repeat(60));
        for line in rendered.lines().filter(|l| l.starts_with("petmap_")) {
            println!("   {}", line);
        }
    }

    println!("\n✨ DEMO COMPLETE!");
    Ok(())
}
