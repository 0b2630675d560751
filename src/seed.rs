//! Demo data loaded at start-up when `ECOCLEAR_SEED` is on.
//!
//! Account ids are fixed so the CLI and curl sessions can address them
//! without a lookup. A property supplier shares its id with the fleet it
//! contracts, so clearance orders land in that fleet's dispatch queue.

use uuid::Uuid;

use crate::model::{
    AssignedDriver, CollectionMethod, CustomerRef, Driver, EnterpriseAccount, EnterpriseProject, Facility,
    FacilityOperationalStatus, FacilityType, FeeConfig, FeeUnit, Fleet, GeoLocation, GovernmentAccount,
    LaborServiceType, MediaType, Notice, NoticeKind, Order, OrderStatus, OrderType, PaymentStatus, PickupDetails,
    ProjectStatus, PropertyAccount, PropertySupplier, SettlementMethod, UserRole, VerificationStatus, WasteAnalysis,
    WasteType, Worker, WorkerAvailability, now_ms,
};
use crate::state::Store;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;
const DEMO_PHOTO: &str = "https://images.unsplash.com/photo-1595278069441-2cf29f8005a4?auto=format&fit=crop&w=800";

/// Fixed ids of the demo accounts.
pub mod ids {
    use uuid::Uuid;

    pub const FACILITY_PUDONG: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_f001);
    pub const FACILITY_ZHANGJIANG: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_f002);
    pub const FLEET_CHENGTOU: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_c001);
    pub const FLEET_LVTONG: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_c002);
    pub const DRIVER_LI: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_d001);
    pub const DRIVER_WANG: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_d002);
    pub const ENTERPRISE: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_e001);
    pub const ENTERPRISE_PROJECT: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_e101);
    pub const PROPERTY: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_a001);
    pub const GOVERNMENT: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_b001);
    pub const WORKER: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
}

/// A store populated with one account of every kind plus an order waiting
/// at the facility gate.
#[must_use]
pub fn demo_store() -> Store {
    let now = now_ms();
    let mut store = Store::new();

    for facility in facilities(now) {
        store.facilities.insert(facility.id, facility);
    }
    for fleet in fleets() {
        store.fleets.insert(fleet.id, fleet);
    }
    for driver in drivers(now) {
        store.drivers.insert(driver.id, driver);
    }

    store.enterprises.insert(
        ids::ENTERPRISE,
        EnterpriseAccount {
            id: ids::ENTERPRISE,
            company_name: "中建八局装饰工程部".into(),
            contact_phone: "13911112222".into(),
            credit_limit: 500_000,
            used_credit: 12_400,
            billing_cycle: "每月10号".into(),
            projects: vec![EnterpriseProject {
                id: ids::ENTERPRISE_PROJECT,
                name: "陆家嘴金融城改造".into(),
                address: "陆家嘴环路".into(),
                location: GeoLocation::at(31.23, 121.5, "陆家嘴环路"),
                status: ProjectStatus::Approved,
                created_at: now,
                has_construction_permit: true,
                has_discharge_permit: true,
                external_sync: None,
            }],
            status: VerificationStatus::Verified,
            contract_price_per_truck: Some(450),
        },
    );

    store.properties.insert(
        ids::PROPERTY,
        PropertyAccount {
            id: ids::PROPERTY,
            name: "万科物业管理部".into(),
            contact_phone: "13800001111".into(),
            managed_communities: vec!["阳光花苑".into(), "滨江一号".into()],
            status: VerificationStatus::Verified,
            suppliers: vec![
                PropertySupplier {
                    id: ids::FLEET_CHENGTOU,
                    name: "城投环境物流车队".into(),
                    manager: "赵经理".into(),
                    phone: "13912345678".into(),
                    truck_count: 12,
                    rating: 4.9,
                    active: true,
                    contract_until: now + 180 * DAY_MS,
                },
                PropertySupplier {
                    id: ids::FLEET_LVTONG,
                    name: "绿通渣土专运".into(),
                    manager: "王调度".into(),
                    phone: "13888889999".into(),
                    truck_count: 8,
                    rating: 4.8,
                    active: true,
                    contract_until: now + 90 * DAY_MS,
                },
            ],
        },
    );

    store.governments.insert(
        ids::GOVERNMENT,
        GovernmentAccount {
            id: ids::GOVERNMENT,
            region_name: "浦东新区".into(),
            department: "生态环境局".into(),
            status: VerificationStatus::Verified,
        },
    );

    store.workers.insert(
        ids::WORKER,
        Worker {
            id: ids::WORKER,
            name: "老张".into(),
            phone: "13611112222".into(),
            team_name: Some("老张拆旧队".into()),
            skills: vec!["打拆".into(), "装卸".into()],
            rating: 4.9,
            availability: WorkerAvailability::Available,
            status: VerificationStatus::Verified,
        },
    );

    store.notices.push(Notice {
        id: Uuid::new_v4(),
        title: "严厉打击非法倾倒".into(),
        content: "近期监管部门将加强夜间巡查，请所有车辆务必闭环电子联单。".into(),
        time: now,
        kind: NoticeKind::Alert,
        target_roles: vec![UserRole::Driver, UserRole::Fleet],
    });

    let order = arriving_order(now);
    store.orders.insert(order.id, order);
    store
}

fn facilities(now: i64) -> Vec<Facility> {
    vec![
        Facility {
            id: ids::FACILITY_PUDONG,
            name: "浦东第一再生资源场".into(),
            address: "浦东新区川沙路 88 号".into(),
            location: GeoLocation::at(31.2, 121.65, "浦东新区川沙路 88 号"),
            contact_phone: "13811112222".into(),
            status: VerificationStatus::Verified,
            joined_at: now - 9_999_999,
            operational_status: FacilityOperationalStatus::Open,
            facility_type: FacilityType::FixedDisposal,
            specialty: "装修垃圾 / 砖渣".into(),
            allowed_waste_types: vec![WasteType::Construction, WasteType::Bulky],
            fee_configs: vec![
                FeeConfig { waste_type: WasteType::Construction, price_per_unit: 450, unit: FeeUnit::Truck },
                FeeConfig { waste_type: WasteType::Bulky, price_per_unit: 600, unit: FeeUnit::Truck },
            ],
            preferred_settlement: SettlementMethod::Platform,
            description: None,
        },
        Facility {
            id: ids::FACILITY_ZHANGJIANG,
            name: "张江临时中转站".into(),
            address: "张江路科苑路口".into(),
            location: GeoLocation::at(31.21, 121.6, "张江路科苑路口"),
            contact_phone: "13800002222".into(),
            status: VerificationStatus::Verified,
            joined_at: now,
            operational_status: FacilityOperationalStatus::Busy,
            facility_type: FacilityType::TempTransfer,
            specialty: "大件垃圾/木材".into(),
            allowed_waste_types: vec![WasteType::Bulky, WasteType::Garden],
            fee_configs: vec![FeeConfig { waste_type: WasteType::Bulky, price_per_unit: 600, unit: FeeUnit::Truck }],
            preferred_settlement: SettlementMethod::Direct,
            description: None,
        },
    ]
}

fn fleets() -> Vec<Fleet> {
    vec![
        Fleet {
            id: ids::FLEET_CHENGTOU,
            name: "城投环境物流车队".into(),
            manager_name: "赵经理".into(),
            total_vehicles: 15,
            safety_score: 98,
            is_authorized_print: true,
            status: VerificationStatus::Verified,
            projects: Vec::new(),
            drivers: vec![ids::DRIVER_LI, ids::DRIVER_WANG],
        },
        Fleet {
            id: ids::FLEET_LVTONG,
            name: "绿通渣土专运".into(),
            manager_name: "王调度".into(),
            total_vehicles: 8,
            safety_score: 95,
            is_authorized_print: true,
            status: VerificationStatus::Verified,
            projects: Vec::new(),
            drivers: Vec::new(),
        },
    ]
}

fn drivers(now: i64) -> Vec<Driver> {
    let fleet_driver = |id, name: &str, phone: &str, plate: &str, vehicle: &str| Driver {
        id,
        name: name.into(),
        phone: phone.into(),
        license_number: "310...".into(),
        vehicle_plate: plate.into(),
        vehicle_type: vehicle.into(),
        status: VerificationStatus::Verified,
        joined_at: now,
        fleet_id: Some(ids::FLEET_CHENGTOU),
        fleet_name: Some("城投环境物流车队".into()),
        is_independent: false,
    };
    vec![
        fleet_driver(ids::DRIVER_LI, "李师傅", "13812345678", "沪A-88888", "Dump Truck"),
        fleet_driver(ids::DRIVER_WANG, "王师傅", "13987654321", "沪C-12345", "Small Truck"),
    ]
}

/// Enterprise load already at the Pudong gate, ready for entry confirmation.
fn arriving_order(now: i64) -> Order {
    let mut order = Order::new(
        CustomerRef { role: UserRole::Enterprise, id: ids::ENTERPRISE },
        OrderType::WasteRemoval,
        OrderStatus::ArrivedDisposal,
        GeoLocation::at(31.23, 121.47, "上海市浦东新区阳光路88号"),
        MediaType::Image,
        DEMO_PHOTO,
    );
    order.created_at = now - 2 * HOUR_MS;
    order.payment_status = Some(PaymentStatus::Credit);
    order.loading_photo = Some(DEMO_PHOTO.into());
    order.assigned_driver = Some(AssignedDriver {
        driver_id: Some(ids::DRIVER_LI),
        name: "李师傅".into(),
        phone: "13812345678".into(),
        plate: "沪A-88888".into(),
        fleet_name: Some("城投环境物流车队".into()),
        fleet_id: Some(ids::FLEET_CHENGTOU),
    });
    order.pickup_details = Some(PickupDetails {
        city: "上海市".into(),
        district: "浦东新区".into(),
        street: "阳光路 888".into(),
        community: "阳光花苑".into(),
        is_collected: true,
        location_type: "GROUND_FLOOR".into(),
        ..PickupDetails::default()
    });
    order.analysis = Some(WasteAnalysis {
        waste_type: WasteType::Construction,
        estimated_weight_kg: 1000.0,
        estimated_volume: "1 车".into(),
        estimated_price: 1200,
        description: "建筑垃圾清运".into(),
        recommended_vehicle: "Dump Truck".into(),
        hazard_warning: None,
        is_bagged: false,
        is_collected: true,
        labor_service_recommendation: LaborServiceType::None,
        recommended_collection_method: CollectionMethod::Immediate,
    });
    order
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
