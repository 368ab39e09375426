//! Pipe-level regressions for the closed-form thermal model.

use dn_components::thermal::{heat_loss, pipe_outlet_temperature};
use dn_components::{NetworkKind, Pipe, PipeCatalog};
use dn_fluids::PhysicalConstants;

#[test]
fn hundred_metre_supply_pipe_loses_little() {
    let consts = PhysicalConstants::default();
    let catalog = PipeCatalog::standard();
    let (idx, fits) = catalog.select(5.0, consts.rho_kg_m3);
    assert!(fits);
    let pipe = Pipe::new(100.0, catalog.records()[idx].clone());

    let k = pipe
        .conduction_coefficient(5.0, Some(353.0), NetworkKind::Heating, &consts)
        .unwrap();
    let t_out = pipe_outlet_temperature(353.0, 5.0, k, 283.0, consts.cp_j_kgk, 30.0).unwrap();

    assert_eq!(pipe.record.dn, "DN65");
    assert!((k - 26.358_879_736).abs() < 1e-6, "K = {k}");
    assert!((t_out - 352.911_877_650).abs() < 1e-6, "t_out = {t_out}");

    let loss = heat_loss(5.0, Some(353.0), Some(t_out), consts.cp_j_kgk);
    let transported = 5.0 * consts.cp_j_kgk * (353.0 - 283.0);
    assert!(loss > 0.0);
    assert!(loss < 0.05 * transported);
}

#[test]
fn pressure_loss_grows_with_flow() {
    let consts = PhysicalConstants::default();
    let record = PipeCatalog::standard().by_dn("DN100").unwrap().clone();
    let pipe = Pipe::new(250.0, record);
    let low = pipe.pressure_loss(2.0, Some(340.0), &consts);
    let high = pipe.pressure_loss(8.0, Some(340.0), &consts);
    assert!(high > 10.0 * low);

    let (dp, slope) = pipe.loss_and_slope(-8.0, Some(340.0), &consts);
    assert!((dp + high).abs() < 1e-9);
    assert!(slope > 0.0);
}
