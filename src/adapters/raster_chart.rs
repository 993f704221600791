//! Price chart rendering onto an in-memory bitmap.
//!
//! Draws, in order: price, short EMA and long EMA polylines, the trend
//! segments that pass the residual gate, then one circle per trade. Buys are
//! outlined; sells are filled when they sold below the active stop-loss.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::chart_layout::{ChartConfig, ChartLayout, PixelScale};
use crate::domain::engine::TradeEvent;
use crate::domain::error::TrendplotError;
use crate::domain::raster::Raster;
use crate::domain::series::Series;
use crate::domain::trend::TrendEstimator;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const PRICE_COLOR: RGBColor = RGBColor(0, 0, 0);
const EMA_SHORT_COLOR: RGBColor = RGBColor(255, 0, 0);
const EMA_LONG_COLOR: RGBColor = RGBColor(120, 120, 0);
const TREND_COLOR: RGBColor = RGBColor(0, 0, 255);
const BUY_COLOR: RGBColor = RGBColor(0, 0, 255);
const SELL_COLOR: RGBColor = RGBColor(0, 255, 0);
const MARKER_RADIUS: i32 = 3;

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub struct Renderer {
    config: ChartConfig,
}

impl Renderer {
    pub fn new(config: ChartConfig) -> Self {
        Renderer { config }
    }

    pub fn render(
        &self,
        series: &Series,
        events: &[TradeEvent],
        estimator: &TrendEstimator<'_>,
    ) -> Result<Raster, TrendplotError> {
        let layout = ChartLayout::compute(series, estimator, &self.config)?;
        let mut raster = Raster::filled(layout.width, layout.height, BACKGROUND);

        {
            let root = BitMapBackend::with_buffer(
                raster.pixels.as_mut_slice(),
                (layout.width, layout.height),
            )
            .into_drawing_area();

            let width = layout.width as usize;
            let prices = series.prices();
            draw_polyline(&root, &layout.scale, &prices[..width], PRICE_COLOR)?;
            draw_polyline(&root, &layout.scale, &series.ema_short()[..width], EMA_SHORT_COLOR)?;
            draw_polyline(&root, &layout.scale, &series.ema_long()[..width], EMA_LONG_COLOR)?;

            draw_trends(&root, &layout)?;
            draw_markers(&root, &layout, events)?;

            root.present().map_err(draw_error)?;
        }

        Ok(raster)
    }
}

fn draw_error<E: std::fmt::Display>(e: E) -> TrendplotError {
    TrendplotError::Encoding {
        reason: format!("drawing failed: {e}"),
    }
}

fn draw_polyline(
    root: &Canvas<'_>,
    scale: &PixelScale,
    values: &[f64],
    color: RGBColor,
) -> Result<(), TrendplotError> {
    if values.len() < 2 {
        return Ok(());
    }
    let points: Vec<(i32, i32)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as i32, scale.y_px(v)))
        .collect();
    root.draw(&PathElement::new(points, color.stroke_width(1)))
        .map_err(draw_error)
}

fn draw_trends(root: &Canvas<'_>, layout: &ChartLayout) -> Result<(), TrendplotError> {
    for segment in layout.segments.iter().filter(|s| s.is_visible()) {
        let ((x0, y0), (x1, y1)) = segment.endpoints();
        let line = vec![
            (x0.round() as i32, layout.scale.y_px(y0)),
            (x1.round() as i32, layout.scale.y_px(y1)),
        ];
        let style = TREND_COLOR.mix(segment.opacity).stroke_width(1);
        root.draw(&PathElement::new(line, style)).map_err(draw_error)?;
    }
    Ok(())
}

fn draw_markers(
    root: &Canvas<'_>,
    layout: &ChartLayout,
    events: &[TradeEvent],
) -> Result<(), TrendplotError> {
    let visible = events
        .iter()
        .filter(|e| e.index() < layout.width as usize);

    for event in visible {
        let center = (event.index() as i32, layout.scale.y_px(event.price()));
        let style = match event {
            TradeEvent::Buy { .. } => BUY_COLOR.stroke_width(1),
            TradeEvent::Sell { .. } if event.sold_below_stop() => SELL_COLOR.filled(),
            TradeEvent::Sell { .. } => SELL_COLOR.stroke_width(1),
        };
        root.draw(&Circle::new(center, MARKER_RADIUS, style))
            .map_err(draw_error)?;
    }
    Ok(())
}
