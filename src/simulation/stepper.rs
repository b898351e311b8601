//! Adaptive Dormand–Prince 5(4) integrator.
//!
//! Explicit embedded Runge–Kutta pair with FSAL reuse, a mixed
//! relative/absolute RMS error norm and local extrapolation (the 5th order
//! solution advances the state). Steps are clamped so that every requested
//! sample time is hit exactly, which keeps the output grid free of
//! interpolation error.
//!
//! Any [`ODEProblem`] can be driven by [`DormandPrince`], so the same stepper
//! integrates the reaction network and the small test systems used to check it.

use peroxide::fuga::ODEProblem;

use super::setup::SimulationSetup;

// Dormand–Prince tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights, also the last row of the tableau
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between the 5th and embedded 4th order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Counters collected during one integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StepStatistics {
    pub accepted: usize,
    pub rejected: usize,
    pub rhs_evaluations: usize,
}

/// Why an integration stopped before the end of the horizon.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    StepSizeUnderflow { step: f64, min_step: f64 },
    StepBudgetExhausted { max_steps: usize },
    NonFiniteState,
    RhsFailed(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::StepSizeUnderflow { step, min_step } => write!(
                f,
                "step size {step:e} fell below the minimum {min_step:e}"
            ),
            StopReason::StepBudgetExhausted { max_steps } => {
                write!(f, "exceeded the budget of {max_steps} steps")
            }
            StopReason::NonFiniteState => write!(f, "state became non-finite"),
            StopReason::RhsFailed(message) => {
                write!(f, "right-hand side evaluation failed: {message}")
            }
        }
    }
}

/// Samples produced by a completed integration.
#[derive(Debug, Clone)]
pub struct StepperOutput {
    pub time: Vec<f64>,
    pub states: Vec<Vec<f64>>,
    pub statistics: StepStatistics,
}

/// An integration that stopped early, with everything reached so far.
#[derive(Debug, Clone)]
pub struct Interrupted {
    /// Last time the solver reached with an accepted step
    pub time: f64,
    pub state: Vec<f64>,
    /// Samples recorded before the failure
    pub output: StepperOutput,
    pub reason: StopReason,
}

/// Adaptive Dormand–Prince 5(4) stepper.
#[derive(Debug, Clone, PartialEq)]
pub struct DormandPrince {
    pub rtol: f64,
    pub atol: f64,
    pub initial_step: Option<f64>,
    pub min_step: f64,
    pub max_step: f64,
    pub max_steps: usize,
}

impl From<&SimulationSetup> for DormandPrince {
    fn from(setup: &SimulationSetup) -> Self {
        Self {
            rtol: setup.rtol,
            atol: setup.atol,
            initial_step: setup.initial_step,
            min_step: setup.min_step,
            max_step: setup.max_step.unwrap_or(f64::INFINITY),
            max_steps: setup.max_steps,
        }
    }
}

impl Default for DormandPrince {
    fn default() -> Self {
        (&SimulationSetup::default()).into()
    }
}

/// Work buffers of one integration.
struct Stages {
    k: [Vec<f64>; 7],
    y_stage: Vec<f64>,
    y_new: Vec<f64>,
}

impl Stages {
    fn new(n: usize) -> Self {
        Self {
            k: std::array::from_fn(|_| vec![0.0; n]),
            y_stage: vec![0.0; n],
            y_new: vec![0.0; n],
        }
    }
}

impl DormandPrince {
    /// Integrates `problem` from `y0` at `times[0]` and records the state at every
    /// entry of `times`, which must be strictly increasing.
    pub fn integrate<P: ODEProblem>(
        &self,
        problem: &P,
        y0: &[f64],
        times: &[f64],
    ) -> Result<StepperOutput, Box<Interrupted>> {
        let n = y0.len();
        let mut output = StepperOutput {
            time: Vec::with_capacity(times.len()),
            states: Vec::with_capacity(times.len()),
            statistics: StepStatistics::default(),
        };

        let Some((&t_start, targets)) = times.split_first() else {
            return Ok(output);
        };

        let mut t = t_start;
        let mut y = y0.to_vec();
        output.time.push(t);
        output.states.push(y.clone());

        let interrupt = |t: f64, y: &[f64], output: StepperOutput, reason: StopReason| {
            Box::new(Interrupted {
                time: t,
                state: y.to_vec(),
                output,
                reason,
            })
        };

        if y.iter().any(|x| !x.is_finite()) {
            return Err(interrupt(t, &y, output, StopReason::NonFiniteState));
        }

        let mut stages = Stages::new(n);
        if let Err(e) = problem.rhs(t, &y, &mut stages.k[0]) {
            return Err(interrupt(t, &y, output, StopReason::RhsFailed(e.to_string())));
        }
        output.statistics.rhs_evaluations += 1;

        let t_end = targets.last().copied().unwrap_or(t_start);
        let h_start = match self.initial_step {
            Some(h0) => h0,
            None => self.estimate_initial_step(problem, t, &y, &mut stages, t_end - t),
        };
        let mut h = h_start.min(self.max_step);
        let mut previous_rejected = false;

        for &target in targets {
            while t < target {
                let remaining = target - t;
                let clamped = h >= remaining;
                let step = if clamped { remaining } else { h };
                if t + step == t {
                    let reason = StopReason::StepSizeUnderflow {
                        step,
                        min_step: self.min_step,
                    };
                    return Err(interrupt(t, &y, output, reason));
                }

                if let Err(e) = self.attempt(problem, t, &y, step, &mut stages) {
                    return Err(interrupt(t, &y, output, StopReason::RhsFailed(e.to_string())));
                }
                output.statistics.rhs_evaluations += 6;

                let error = self.error_norm(&y, &stages, step);

                if error <= 1.0 {
                    t = if clamped { target } else { t + step };
                    std::mem::swap(&mut y, &mut stages.y_new);
                    stages.k.swap(0, 6);
                    output.statistics.accepted += 1;

                    if y.iter().any(|x| !x.is_finite()) {
                        return Err(interrupt(t, &y, output, StopReason::NonFiniteState));
                    }
                    if output.statistics.accepted >= self.max_steps && t < t_end {
                        let reason = StopReason::StepBudgetExhausted {
                            max_steps: self.max_steps,
                        };
                        return Err(interrupt(t, &y, output, reason));
                    }

                    let mut factor = if error == 0.0 {
                        MAX_FACTOR
                    } else {
                        (SAFETY * error.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
                    };
                    if previous_rejected {
                        factor = factor.min(1.0);
                    }
                    previous_rejected = false;

                    // A step shortened to land on a sample says nothing about the
                    // step size the dynamics allow, so never shrink because of it.
                    let proposal = step * factor;
                    h = if clamped { h.max(proposal) } else { proposal };
                    h = h.min(self.max_step);

                    if h < self.min_step {
                        let reason = StopReason::StepSizeUnderflow {
                            step: h,
                            min_step: self.min_step,
                        };
                        return Err(interrupt(t, &y, output, reason));
                    }
                } else {
                    output.statistics.rejected += 1;
                    previous_rejected = true;

                    let factor = if error.is_finite() {
                        (SAFETY * error.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
                    } else {
                        MIN_FACTOR
                    };
                    h = step * factor;

                    if h < self.min_step {
                        let reason = StopReason::StepSizeUnderflow {
                            step: h,
                            min_step: self.min_step,
                        };
                        return Err(interrupt(t, &y, output, reason));
                    }
                }
            }

            output.time.push(target);
            output.states.push(y.clone());
        }

        Ok(output)
    }

    /// Evaluates stages 2..7 for a step of size `h` from `(t, y)`.
    ///
    /// Expects `k[0]` to hold `f(t, y)`; leaves the 5th order solution in `y_new`
    /// and `f(t + h, y_new)` in `k[6]`.
    fn attempt<P: ODEProblem>(
        &self,
        problem: &P,
        t: f64,
        y: &[f64],
        h: f64,
        stages: &mut Stages,
    ) -> anyhow::Result<()> {
        let n = y.len();
        let Stages { k, y_stage, y_new } = stages;

        for i in 0..n {
            y_stage[i] = y[i] + h * A21 * k[0][i];
        }
        problem.rhs(t + C2 * h, y_stage, &mut k[1])?;

        for i in 0..n {
            y_stage[i] = y[i] + h * (A31 * k[0][i] + A32 * k[1][i]);
        }
        problem.rhs(t + C3 * h, y_stage, &mut k[2])?;

        for i in 0..n {
            y_stage[i] = y[i] + h * (A41 * k[0][i] + A42 * k[1][i] + A43 * k[2][i]);
        }
        problem.rhs(t + C4 * h, y_stage, &mut k[3])?;

        for i in 0..n {
            y_stage[i] =
                y[i] + h * (A51 * k[0][i] + A52 * k[1][i] + A53 * k[2][i] + A54 * k[3][i]);
        }
        problem.rhs(t + C5 * h, y_stage, &mut k[4])?;

        for i in 0..n {
            y_stage[i] = y[i]
                + h * (A61 * k[0][i]
                    + A62 * k[1][i]
                    + A63 * k[2][i]
                    + A64 * k[3][i]
                    + A65 * k[4][i]);
        }
        problem.rhs(t + h, y_stage, &mut k[5])?;

        for i in 0..n {
            y_new[i] = y[i]
                + h * (B1 * k[0][i] + B3 * k[2][i] + B4 * k[3][i] + B5 * k[4][i] + B6 * k[5][i]);
        }
        problem.rhs(t + h, y_new, &mut k[6])?;

        Ok(())
    }

    /// RMS of the local error estimate scaled by `atol + rtol·max(|y|, |y_new|)`.
    fn error_norm(&self, y: &[f64], stages: &Stages, h: f64) -> f64 {
        let n = y.len();
        if n == 0 {
            return 0.0;
        }
        let k = &stages.k;

        let sum: f64 = (0..n)
            .map(|i| {
                let e = h
                    * (E1 * k[0][i]
                        + E3 * k[2][i]
                        + E4 * k[3][i]
                        + E5 * k[4][i]
                        + E6 * k[5][i]
                        + E7 * k[6][i]);
                let scale = self.atol + self.rtol * y[i].abs().max(stages.y_new[i].abs());
                (e / scale).powi(2)
            })
            .sum();

        (sum / n as f64).sqrt()
    }

    /// Initial step heuristic of Hairer, Nørsett & Wanner (II.4).
    fn estimate_initial_step<P: ODEProblem>(
        &self,
        problem: &P,
        t: f64,
        y: &[f64],
        stages: &mut Stages,
        span: f64,
    ) -> f64 {
        let n = y.len().max(1) as f64;
        let scale: Vec<f64> = y.iter().map(|x| self.atol + self.rtol * x.abs()).collect();
        let norm = |v: &[f64]| {
            (v.iter()
                .zip(&scale)
                .map(|(x, s)| (x / s).powi(2))
                .sum::<f64>()
                / n)
                .sqrt()
        };

        let d0 = norm(y);
        let d1 = norm(&stages.k[0]);
        let h0: f64 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(span);

        // Explicit Euler probe to estimate the second derivative
        let Stages { k, y_stage, .. } = stages;
        for i in 0..y.len() {
            y_stage[i] = y[i] + h0 * k[0][i];
        }
        if problem.rhs(t + h0, y_stage, &mut k[1]).is_err() {
            return h0.max(self.min_step);
        }

        let diff: Vec<f64> = k[1].iter().zip(&k[0]).map(|(a, b)| (a - b) / h0).collect();
        let d2 = norm(&diff);

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };

        (100.0 * h0).min(h1).min(span).max(self.min_step)
    }
}
