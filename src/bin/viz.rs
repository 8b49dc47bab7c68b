use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use ballbot_sim::control::PidParams;
use ballbot_sim::sim::Engine;
use ballbot_sim::state::{SimSettings, MAX_MASS, MIN_MASS};

fn main() -> eframe::Result {
    let engine = Engine::new();
    let params = engine.params();
    let settings = engine.settings();

    let app = BalanceViz { engine, params, settings };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Ballbot Balance Simulator", options, Box::new(|_| Ok(Box::new(app))))
}

struct BalanceViz {
    engine: Engine,
    // Edited copies, pushed to the engine every frame.
    params: PidParams,
    settings: SimSettings,
}

impl eframe::App for BalanceViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.engine.set_params(self.params);
        self.engine.set_settings(self.settings);
        self.settings = self.engine.settings(); // pick up the mass clamp

        let dt = ctx.input(|i| i.stable_dt) as f64;
        self.engine.frame(dt);
        let state = self.engine.state();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Ballbot Balance Simulator");
            let status = if state.crashed { "CRASHED — restarting" } else { "balancing" };
            ui.label(format!(
                "t: {:>6.1} s  |  tilt: {:>6.2}°  |  motor: {:>6.1} N  |  {}",
                state.time,
                state.angle.to_degrees(),
                state.effective_force,
                status,
            ));
        });

        egui::SidePanel::left("controls").min_width(220.0).show(ctx, |ui| {
            ui.heading("PID Gains");
            ui.add(egui::Slider::new(&mut self.params.kp, 0.0..=1600.0).text("Kp"));
            ui.add(egui::Slider::new(&mut self.params.ki, 0.0..=50.0).text("Ki"));
            ui.add(egui::Slider::new(&mut self.params.kd, 0.0..=300.0).text("Kd"));
            if ui.button("Auto-tune for mass").clicked() {
                self.params = self.engine.auto_tune();
            }

            ui.separator();
            ui.heading("Robot");
            ui.add(
                egui::Slider::new(&mut self.settings.robot_mass, MIN_MASS..=MAX_MASS)
                    .text("Mass (kg)"),
            );
            ui.checkbox(&mut self.settings.sensor_noise, "Sensor noise");
            ui.checkbox(&mut self.settings.turbulence, "Turbulence");

            ui.separator();
            ui.heading("Disturb");
            ui.horizontal(|ui| {
                if ui.button("Smash left").clicked() {
                    self.engine.apply_impulse(-300.0);
                }
                if ui.button("Smash right").clicked() {
                    self.engine.apply_impulse(300.0);
                }
            });
            if ui.button("Reset").clicked() {
                self.engine.reset();
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let samples: Vec<_> = self.engine.telemetry().iter().copied().collect();
            let available = ui.available_size();
            let half_h = available.y / 2.0 - 8.0;

            // Tilt vs setpoint
            ui.label("Tilt (deg)");
            let tilt: PlotPoints = samples.iter().map(|s| [s.time, s.angle_deg]).collect();
            let setpoint: PlotPoints = samples.iter().map(|s| [s.time, 0.0]).collect();
            Plot::new("tilt")
                .height(half_h)
                .x_axis_label("Time (s)")
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("Tilt", tilt));
                    plot_ui.line(Line::new("Setpoint", setpoint));
                });

            // Commanded vs delivered force, with the PID breakdown
            ui.label("Motor force (N)");
            let cmd: PlotPoints = samples.iter().map(|s| [s.time, s.output]).collect();
            let eff: PlotPoints = samples.iter().map(|s| [s.time, s.effective]).collect();
            let p: PlotPoints = samples.iter().map(|s| [s.time, s.p]).collect();
            let i: PlotPoints = samples.iter().map(|s| [s.time, s.i]).collect();
            let d: PlotPoints = samples.iter().map(|s| [s.time, s.d]).collect();
            Plot::new("force")
                .height(half_h)
                .x_axis_label("Time (s)")
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("Commanded", cmd));
                    plot_ui.line(Line::new("Delivered", eff));
                    plot_ui.line(Line::new("P", p));
                    plot_ui.line(Line::new("I", i));
                    plot_ui.line(Line::new("D", d));
                });
        });

        // Keep simulating even without input events.
        ctx.request_repaint();
    }
}
